//! Client-held feed state.
//!
//! `FeedView` is the single owner of what the UI shows for one page of the
//! feed. Likes are applied optimistically and reconciled per post; edits,
//! deletes, new posts and new comments go to the server first and are
//! followed by `refresh()` so counts and ordering come from the server.

use std::{collections::HashMap, future::Future, time::Duration};

use crate::{
    client::{
        api::FeedApi,
        reconciler::{LikeAction, LikeState, Reconciled},
    },
    config::DEFAULT_MAX_UPLOAD_BYTES,
    error::AppError,
    models::{
        comment::{Comment, CommentId},
        post::{Post, PostId},
    },
    utils::media::check_upload,
};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// A failure surfaced to the user without interrupting anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub post_id: Option<PostId>,
    pub error: AppError,
}

impl Notice {
    pub fn message(&self) -> String {
        match &self.error {
            AppError::Unauthenticated => "Your session has expired. Please sign in again.".to_string(),
            AppError::Permission(_) => "You can only change your own posts.".to_string(),
            AppError::NotFound(_) => "This post is no longer available.".to_string(),
            AppError::Transient(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// One post row of the feed with its like affordance.
#[derive(Debug, Clone)]
pub struct PostEntry {
    post: Post,
    like: Reconciled<LikeState>,
}

impl PostEntry {
    fn new(post: Post) -> Self {
        let like = Reconciled::new(LikeState {
            liked: post.liked_by_me,
            likes_count: post.likes_count,
        });
        Self { post, like }
    }

    /// The post as currently displayed, tentative like state included.
    pub fn post(&self) -> Post {
        let like = self.like.visible();
        Post {
            liked_by_me: like.liked,
            likes_count: like.likes_count,
            ..self.post.clone()
        }
    }

    pub fn like_state(&self) -> LikeState {
        *self.like.visible()
    }

    pub fn is_pending(&self) -> bool {
        self.like.is_pending()
    }
}

/// Handle for one in-flight like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeTicket {
    pub post_id: PostId,
    pub action: LikeAction,
    generation: u64,
}

/// Outcome of a client-side edit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    /// Nothing to send: empty or unchanged content.
    Skipped,
}

pub struct FeedView {
    entries: Vec<PostEntry>,
    comments: HashMap<PostId, Vec<Comment>>,
    notices: Vec<Notice>,
    page: i64,
    page_size: i64,
    generation: u64,
    call_timeout: Duration,
    max_upload_bytes: usize,
}

/// Bounds an API call; expiry counts as a transient failure.
async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Transient("request timed out".to_string())),
    }
}

impl FeedView {
    pub fn new(page_size: i64) -> Self {
        Self {
            entries: Vec::new(),
            comments: HashMap::new(),
            notices: Vec::new(),
            page: 0,
            page_size,
            generation: 0,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_bytes: usize) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }

    pub fn entries(&self) -> &[PostEntry] {
        &self.entries
    }

    pub fn posts(&self) -> Vec<Post> {
        self.entries.iter().map(PostEntry::post).collect()
    }

    pub fn entry(&self, post_id: PostId) -> Option<&PostEntry> {
        self.entries.iter().find(|e| e.post.id == post_id)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn comments(&self, post_id: PostId) -> &[Comment] {
        self.comments.get(&post_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, post_id: Option<PostId>, error: AppError) {
        tracing::warn!(?post_id, kind = error.kind(), "Feed action failed: {}", error);
        self.notices.push(Notice { post_id, error });
    }

    /// Reloads the current page. Tickets issued before the reload become stale.
    pub async fn refresh(&mut self, api: &dyn FeedApi) -> Result<(), AppError> {
        match bounded(self.call_timeout, api.list_posts(self.page, self.page_size)).await {
            Ok(posts) => {
                self.entries = posts.into_iter().map(PostEntry::new).collect();
                self.generation += 1;
                let visible: Vec<PostId> = self.entries.iter().map(|e| e.post.id).collect();
                self.comments.retain(|id, _| visible.contains(id));
                Ok(())
            }
            Err(e) => {
                self.notify(None, e.clone());
                Err(e)
            }
        }
    }

    pub async fn go_to_page(&mut self, api: &dyn FeedApi, page: i64) -> Result<(), AppError> {
        self.page = page.max(0);
        self.refresh(api).await
    }

    /// Applies the tentative like state synchronously.
    /// Returns `None` for unknown posts or while a toggle is already in flight.
    pub fn begin_like_toggle(&mut self, post_id: PostId) -> Option<LikeTicket> {
        let generation = self.generation;
        let entry = self.entries.iter_mut().find(|e| e.post.id == post_id)?;
        let (tentative, action) = entry.like.visible().toggled();
        if !entry.like.begin(tentative) {
            return None;
        }
        Some(LikeTicket {
            post_id,
            action,
            generation,
        })
    }

    /// Settles a toggle with the outcome of its network call.
    /// Returns `true` when the call failed with a stale-state error and the
    /// caller should `refresh()`.
    pub fn finish_like_toggle(&mut self, ticket: LikeTicket, result: Result<(), AppError>) -> bool {
        if ticket.generation != self.generation {
            // The page was reloaded with server state in the meantime.
            return false;
        }
        let Some(entry) = self.entries.iter_mut().find(|e| e.post.id == ticket.post_id) else {
            return false;
        };

        match result {
            Ok(()) | Err(AppError::Duplicate(_)) => {
                entry.like.confirm();
                false
            }
            Err(e) => {
                entry.like.rollback();
                let stale = matches!(e, AppError::NotFound(_));
                self.notify(Some(ticket.post_id), e);
                stale
            }
        }
    }

    /// Optimistic like/unlike of one post.
    pub async fn toggle_like(&mut self, api: &dyn FeedApi, post_id: PostId) -> Result<(), AppError> {
        let Some(ticket) = self.begin_like_toggle(post_id) else {
            return Ok(());
        };

        let result = match ticket.action {
            LikeAction::Like => bounded(self.call_timeout, api.like(post_id)).await,
            LikeAction::Unlike => bounded(self.call_timeout, api.unlike(post_id)).await,
        };

        let outcome = result.clone();
        if self.finish_like_toggle(ticket, result) {
            // Refresh failures are already recorded as notices.
            let _ = self.refresh(api).await;
        }
        match outcome {
            Err(AppError::Duplicate(_)) => Ok(()),
            other => other,
        }
    }

    /// Runs a structural mutation, then reloads; stale-state errors also reload.
    async fn mutate<T>(
        &mut self,
        api: &dyn FeedApi,
        post_id: Option<PostId>,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match bounded(self.call_timeout, call).await {
            Ok(value) => {
                let _ = self.refresh(api).await;
                Ok(value)
            }
            Err(e) => {
                self.notify(post_id, e.clone());
                if matches!(e, AppError::NotFound(_)) {
                    let _ = self.refresh(api).await;
                }
                Err(e)
            }
        }
    }

    /// Edits a post. Empty or unchanged content never reaches the network.
    pub async fn edit_post(
        &mut self,
        api: &dyn FeedApi,
        post_id: PostId,
        content: &str,
    ) -> Result<EditOutcome, AppError> {
        let trimmed = content.trim();
        let unchanged = self
            .entry(post_id)
            .is_some_and(|e| e.post.content == trimmed);
        if trimmed.is_empty() || unchanged {
            return Ok(EditOutcome::Skipped);
        }

        self.mutate(api, Some(post_id), api.update_post(post_id, trimmed))
            .await
            .map(|_| EditOutcome::Saved)
    }

    pub async fn delete_post(&mut self, api: &dyn FeedApi, post_id: PostId) -> Result<(), AppError> {
        self.mutate(api, Some(post_id), api.delete_post(post_id)).await
    }

    /// Uploads the optional image first, then creates the post.
    pub async fn create_post(
        &mut self,
        api: &dyn FeedApi,
        content: &str,
        image: Option<(Vec<u8>, String)>,
    ) -> Result<PostId, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("content must not be empty".to_string()));
        }

        let image_url = match image {
            Some((bytes, content_type)) => {
                check_upload(bytes.len(), &content_type, self.max_upload_bytes)?;
                match bounded(self.call_timeout, api.upload_media(bytes, &content_type)).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        self.notify(None, e.clone());
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        self.mutate(api, None, api.create_post(content, image_url.as_deref()))
            .await
    }

    pub async fn load_comments(
        &mut self,
        api: &dyn FeedApi,
        post_id: PostId,
    ) -> Result<&[Comment], AppError> {
        match bounded(self.call_timeout, api.list_comments(post_id)).await {
            Ok(comments) => {
                self.comments.insert(post_id, comments);
                Ok(self.comments(post_id))
            }
            Err(e) => {
                self.notify(Some(post_id), e.clone());
                if matches!(e, AppError::NotFound(_)) {
                    let _ = self.refresh(api).await;
                }
                Err(e)
            }
        }
    }

    /// Adds a comment, then reloads the thread and the page so
    /// `comments_count` reflects the server.
    pub async fn add_comment(
        &mut self,
        api: &dyn FeedApi,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentId, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("comment must not be empty".to_string()));
        }

        let id = self
            .mutate(api, Some(post_id), api.create_comment(post_id, content))
            .await?;
        let _ = self.load_comments(api, post_id).await;
        Ok(id)
    }
}
