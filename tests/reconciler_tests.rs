// tests/reconciler_tests.rs

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use facility_feed::{
    client::{EditOutcome, FeedApi, FeedView, LikeState, LocalFeedApi},
    config::Config,
    error::AppError,
    models::{
        comment::{Comment, CommentId},
        post::{Post, PostId},
        user::{Identity, User},
    },
    state::AppState,
    store::MemoryStore,
    utils::media::LocalMediaUploader,
};

const ADA: Identity = Identity { user_id: 1, facility_id: 10 };
const BO: Identity = Identity { user_id: 2, facility_id: 10 };

/// Wraps the in-process API with failure injection and call counting.
struct ScriptedApi {
    inner: LocalFeedApi,
    fail_likes: AtomicBool,
    slow_likes: AtomicBool,
    list_calls: AtomicUsize,
    update_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl ScriptedApi {
    fn new(inner: LocalFeedApi) -> Self {
        Self {
            inner,
            fail_likes: AtomicBool::new(false),
            slow_likes: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
        }
    }

    async fn ledger_call(&self) -> Result<(), AppError> {
        if self.slow_likes.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail_likes.load(Ordering::SeqCst) {
            return Err(AppError::Transient("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedApi for ScriptedApi {
    async fn list_posts(&self, page: i64, page_size: i64) -> Result<Vec<Post>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_posts(page, page_size).await
    }

    async fn create_post(&self, content: &str, image_url: Option<&str>) -> Result<PostId, AppError> {
        self.inner.create_post(content, image_url).await
    }

    async fn update_post(&self, post_id: PostId, content: &str) -> Result<(), AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update_post(post_id, content).await
    }

    async fn delete_post(&self, post_id: PostId) -> Result<(), AppError> {
        self.inner.delete_post(post_id).await
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        self.inner.list_comments(post_id).await
    }

    async fn create_comment(&self, post_id: PostId, content: &str) -> Result<CommentId, AppError> {
        self.inner.create_comment(post_id, content).await
    }

    async fn like(&self, post_id: PostId) -> Result<(), AppError> {
        self.ledger_call().await?;
        self.inner.like(post_id).await
    }

    async fn unlike(&self, post_id: PostId) -> Result<(), AppError> {
        self.ledger_call().await?;
        self.inner.unlike(post_id).await
    }

    async fn upload_media(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.upload_media(bytes, content_type).await
    }
}

struct Fixture {
    ada: LocalFeedApi,
    bo: ScriptedApi,
    _media_dir: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    let media_dir = tempfile::tempdir().unwrap();
    let media_path = media_dir.path().to_str().unwrap().to_string();
    let config = Config::for_memory("unused", &media_path, "http://localhost:3000/media");

    let store = Arc::new(MemoryStore::new());
    for (id, name) in [(1, "Dr. Ada"), (2, "Nurse Bo")] {
        store
            .add_user(User {
                id,
                display_name: name.to_string(),
                facility_id: 10,
            })
            .await;
    }
    let media = Arc::new(LocalMediaUploader::new(
        &config.media_dir,
        &config.media_base_url,
        config.max_upload_bytes,
    ));
    let state = AppState::new(store, media, config);

    Fixture {
        ada: LocalFeedApi::from_state(&state, ADA),
        bo: ScriptedApi::new(LocalFeedApi::from_state(&state, BO)),
        _media_dir: media_dir,
    }
}

#[tokio::test]
async fn failed_like_restores_exact_snapshot() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Staff picnic", None).await.unwrap();
    f.ada.like(post_id).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let snapshot = view.entry(post_id).unwrap().post();
    let snapshot_like = view.entry(post_id).unwrap().like_state();

    f.bo.fail_likes.store(true, Ordering::SeqCst);
    let result = view.toggle_like(&f.bo, post_id).await;

    assert!(matches!(result, Err(AppError::Transient(_))));
    let entry = view.entry(post_id).unwrap();
    assert!(!entry.is_pending());
    assert_eq!(entry.like_state(), snapshot_like);
    assert_eq!(entry.post(), snapshot);
    assert_eq!(view.notices().len(), 1);
    assert_eq!(view.notices()[0].post_id, Some(post_id));

    let server = f.ada.list_posts(0, 20).await.unwrap();
    assert_eq!(server[0].likes_count, 1);
}

#[tokio::test]
async fn successful_like_needs_no_refetch() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Badge photos", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let lists_before = f.bo.list_calls.load(Ordering::SeqCst);

    view.toggle_like(&f.bo, post_id).await.unwrap();

    assert_eq!(f.bo.list_calls.load(Ordering::SeqCst), lists_before);
    assert_eq!(
        view.entry(post_id).unwrap().like_state(),
        LikeState {
            liked: true,
            likes_count: 1
        }
    );
    assert!(view.notices().is_empty());

    view.toggle_like(&f.bo, post_id).await.unwrap();
    assert_eq!(
        view.entry(post_id).unwrap().like_state(),
        LikeState {
            liked: false,
            likes_count: 0
        }
    );
    assert_eq!(f.ada.list_posts(0, 20).await.unwrap()[0].likes_count, 0);
}

#[tokio::test]
async fn timed_out_like_rolls_back() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Slow network", None).await.unwrap();

    let mut view = FeedView::new(20).with_call_timeout(Duration::from_millis(50));
    view.refresh(&f.bo).await.unwrap();
    let before = view.entry(post_id).unwrap().like_state();

    f.bo.slow_likes.store(true, Ordering::SeqCst);
    let err = view.toggle_like(&f.bo, post_id).await.unwrap_err();

    assert!(matches!(err, AppError::Transient(_)));
    assert_eq!(view.entry(post_id).unwrap().like_state(), before);
    assert_eq!(f.ada.list_posts(0, 20).await.unwrap()[0].likes_count, 0);
}

#[tokio::test]
async fn tentative_state_is_visible_before_the_call_resolves() {
    let f = fixture().await;
    let first = f.ada.create_post("one", None).await.unwrap();
    let second = f.ada.create_post("two", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();

    let a = view.begin_like_toggle(first).unwrap();
    let b = view.begin_like_toggle(second).unwrap();
    assert!(view.begin_like_toggle(first).is_none());

    assert!(view.entry(first).unwrap().is_pending());
    assert_eq!(view.entry(first).unwrap().post().likes_count, 1);
    assert!(view.entry(second).unwrap().post().liked_by_me);

    // Independent outcomes for independent posts.
    view.finish_like_toggle(b, Err(AppError::Transient("dropped".into())));
    view.finish_like_toggle(a, Ok(()));

    assert_eq!(
        view.entry(first).unwrap().like_state(),
        LikeState { liked: true, likes_count: 1 }
    );
    assert_eq!(
        view.entry(second).unwrap().like_state(),
        LikeState { liked: false, likes_count: 0 }
    );
}

#[tokio::test]
async fn duplicate_like_is_treated_as_success() {
    let f = fixture().await;
    let post_id = f.ada.create_post("dup", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let ticket = view.begin_like_toggle(post_id).unwrap();
    view.finish_like_toggle(ticket, Err(AppError::Duplicate("already liked".into())));

    assert!(view.entry(post_id).unwrap().like_state().liked);
    assert!(view.notices().is_empty());
}

#[tokio::test]
async fn tickets_from_before_a_refresh_are_ignored() {
    let f = fixture().await;
    let post_id = f.ada.create_post("stale", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let ticket = view.begin_like_toggle(post_id).unwrap();

    view.refresh(&f.bo).await.unwrap();
    view.finish_like_toggle(ticket, Err(AppError::Transient("late".into())));

    let entry = view.entry(post_id).unwrap();
    assert!(!entry.is_pending());
    assert_eq!(entry.like_state(), LikeState { liked: false, likes_count: 0 });
    assert!(view.notices().is_empty());
}

#[tokio::test]
async fn empty_or_unchanged_edits_skip_the_network() {
    let f = fixture().await;
    let post_id = f.bo.create_post("Locker rooms repainted", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();

    assert_eq!(view.edit_post(&f.bo, post_id, "   ").await.unwrap(), EditOutcome::Skipped);
    assert_eq!(
        view.edit_post(&f.bo, post_id, "Locker rooms repainted").await.unwrap(),
        EditOutcome::Skipped
    );
    assert_eq!(f.bo.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_edit_reloads_the_feed() {
    let f = fixture().await;
    let post_id = f.bo.create_post("draft", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let lists_before = f.bo.list_calls.load(Ordering::SeqCst);

    assert_eq!(view.edit_post(&f.bo, post_id, "final").await.unwrap(), EditOutcome::Saved);

    assert_eq!(f.bo.list_calls.load(Ordering::SeqCst), lists_before + 1);
    assert_eq!(view.entry(post_id).unwrap().post().content, "final");
}

#[tokio::test]
async fn editing_someone_elses_post_fails_and_keeps_state() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Ada's post", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();

    let err = view.edit_post(&f.bo, post_id, "Bo's now").await.unwrap_err();
    assert!(matches!(err, AppError::Permission(_)));
    assert_eq!(view.entry(post_id).unwrap().post().content, "Ada's post");

    let err = view.delete_post(&f.bo, post_id).await.unwrap_err();
    assert!(matches!(err, AppError::Permission(_)));
    assert_eq!(view.posts().len(), 1);
    assert_eq!(view.notices().len(), 2);
}

#[tokio::test]
async fn vanished_post_triggers_refresh() {
    let f = fixture().await;
    let post_id = f.ada.create_post("soon gone", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    f.ada.delete_post(post_id).await.unwrap();

    let err = view.toggle_like(&f.bo, post_id).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(view.entry(post_id).is_none());
    assert_eq!(view.take_notices().len(), 1);
}

#[tokio::test]
async fn delete_and_create_reload_from_server() {
    let f = fixture().await;
    let mut view = FeedView::new(20);

    let post_id = view.create_post(&f.bo, "Lost & found box", None).await.unwrap();
    assert_eq!(view.posts().len(), 1);
    assert_eq!(view.posts()[0].id, post_id);

    view.delete_post(&f.bo, post_id).await.unwrap();
    assert!(view.posts().is_empty());
}

#[tokio::test]
async fn blank_post_and_oversized_image_never_leave_the_client() {
    let f = fixture().await;
    let mut view = FeedView::new(20).with_max_upload_bytes(8);

    assert!(matches!(
        view.create_post(&f.bo, "  ", None).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        view.create_post(&f.bo, "pic", Some((vec![0; 9], "image/png".to_string()))).await,
        Err(AppError::Upload(_))
    ));
    assert_eq!(f.bo.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.bo.list_calls.load(Ordering::SeqCst), 0);

    let id = view
        .create_post(&f.bo, "pic", Some((vec![1; 8], "image/png".to_string())))
        .await
        .unwrap();
    assert_eq!(f.bo.upload_calls.load(Ordering::SeqCst), 1);
    let shown = view.entry(id).unwrap().post();
    assert!(shown.image_url.unwrap().starts_with("http://localhost:3000/media/"));
}

#[tokio::test]
async fn added_comment_updates_thread_and_count() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Holiday rota", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();

    assert!(view.add_comment(&f.bo, post_id, "").await.is_err());
    view.add_comment(&f.bo, post_id, "I can take the 24th").await.unwrap();

    assert_eq!(view.comments(post_id).len(), 1);
    assert_eq!(view.comments(post_id)[0].author.display_name, "Nurse Bo");
    assert_eq!(view.entry(post_id).unwrap().post().comments_count, 1);
}

#[tokio::test]
async fn unchanged_edit_of_markup_text_stays_local() {
    let f = fixture().await;
    let post_id = f.bo.create_post("Tom & Jerry: BP < 120", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    assert_eq!(view.entry(post_id).unwrap().post().content, "Tom & Jerry: BP < 120");

    assert_eq!(
        view.edit_post(&f.bo, post_id, " Tom & Jerry: BP < 120 ").await.unwrap(),
        EditOutcome::Skipped
    );
    assert_eq!(f.bo.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn paging_through_the_feed() {
    let f = fixture().await;
    assert_eq!(f.bo.inner.identity(), BO);
    for i in 0..5 {
        f.ada.create_post(&format!("notice {}", i), None).await.unwrap();
    }

    let mut view = FeedView::new(2);
    view.go_to_page(&f.bo, 2).await.unwrap();
    assert_eq!(view.page(), 2);
    assert_eq!(view.entries().len(), 1);
    assert_eq!(view.entries()[0].post().content, "notice 0");

    view.go_to_page(&f.bo, -1).await.unwrap();
    assert_eq!(view.page(), 0);
    let shown: Vec<String> = view.entries().iter().map(|e| e.post().content).collect();
    assert_eq!(shown, ["notice 4", "notice 3"]);

    view.go_to_page(&f.bo, 9).await.unwrap();
    assert!(view.entries().is_empty());
}

#[tokio::test]
async fn notices_carry_user_facing_messages() {
    let f = fixture().await;
    let post_id = f.ada.create_post("Ada only", None).await.unwrap();

    let mut view = FeedView::new(20);
    view.refresh(&f.bo).await.unwrap();
    let _ = view.delete_post(&f.bo, post_id).await;

    f.bo.fail_likes.store(true, Ordering::SeqCst);
    let _ = view.toggle_like(&f.bo, post_id).await;

    let messages: Vec<String> = view.take_notices().iter().map(|n| n.message()).collect();
    assert_eq!(
        messages,
        [
            "You can only change your own posts.",
            "Something went wrong. Please try again.",
        ]
    );
    assert!(view.notices().is_empty());
}
