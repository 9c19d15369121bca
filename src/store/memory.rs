use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentId, NewComment},
        post::{NewPost, PageWindow, Post, PostId, PostRecord},
        user::{AuthorSummary, FacilityId, User, UserId},
    },
    store::SocialStore,
};

#[derive(Debug, Clone)]
struct PostRow {
    id: PostId,
    author_id: UserId,
    facility_id: FacilityId,
    content: String,
    image_url: Option<String>,
    likes_count: i32,
    comments_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: CommentId,
    post_id: PostId,
    author_id: UserId,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    posts: BTreeMap<PostId, PostRow>,
    comments: Vec<CommentRow>,
    likes: HashSet<(PostId, UserId)>,
    next_post_id: PostId,
    next_comment_id: CommentId,
    clock: Option<DateTime<Utc>>,
}

impl State {
    /// Wall clock that never goes backwards, so insertion order and
    /// `created_at` order agree.
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.clock {
            Some(last) if last > now => last,
            _ => now,
        };
        self.clock = Some(now);
        now
    }

    fn author(&self, id: UserId) -> AuthorSummary {
        AuthorSummary {
            id,
            display_name: self
                .users
                .get(&id)
                .map(|u| u.display_name.clone())
                .unwrap_or_default(),
        }
    }

    fn view(&self, row: &PostRow, viewer_id: UserId) -> Post {
        Post {
            id: row.id,
            content: row.content.clone(),
            image_url: row.image_url.clone(),
            author: self.author(row.author_id),
            facility_id: row.facility_id,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            liked_by_me: self.likes.contains(&(row.id, viewer_id)),
        }
    }
}

/// In-process store used by tests and `STORE_BACKEND=memory`.
///
/// One lock guards all tables; every mutation takes the write lock once,
/// so a fact and its counter always change together.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory user so posts and comments can reference it.
    pub async fn add_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Number of like facts for a post, independent of the stored counter.
    pub async fn like_fact_count(&self, post_id: PostId) -> usize {
        let state = self.state.read().await;
        state.likes.iter().filter(|(p, _)| *p == post_id).count()
    }

    /// Number of comment rows for a post, independent of the stored counter.
    pub async fn comment_fact_count(&self, post_id: PostId) -> usize {
        let state = self.state.read().await;
        state.comments.iter().filter(|c| c.post_id == post_id).count()
    }
}

/// Parses `id:name:facility` entries separated by `;`.
pub fn parse_seed_users(raw: &str) -> Result<Vec<User>, AppError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<User, AppError> {
            let invalid = || AppError::Validation(format!("invalid user entry '{}'", entry));
            let mut parts = entry.splitn(3, ':');
            let id = parts.next().and_then(|v| v.trim().parse().ok()).ok_or_else(invalid)?;
            let display_name = parts.next().map(str::trim).filter(|v| !v.is_empty()).ok_or_else(invalid)?;
            let facility_id = parts.next().and_then(|v| v.trim().parse().ok()).ok_or_else(invalid)?;
            Ok(User {
                id,
                display_name: display_name.to_string(),
                facility_id,
            })
        })
        .collect()
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn list_posts(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        window: PageWindow,
    ) -> Result<Vec<Post>, AppError> {
        let state = self.state.read().await;
        let mut rows: Vec<&PostRow> = state
            .posts
            .values()
            .filter(|p| p.facility_id == facility_id)
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(rows
            .into_iter()
            .skip(window.offset.max(0) as usize)
            .take(window.limit.max(0) as usize)
            .map(|row| state.view(row, viewer_id))
            .collect())
    }

    async fn get_post(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        post_id: PostId,
    ) -> Result<Option<Post>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .get(&post_id)
            .filter(|p| p.facility_id == facility_id)
            .map(|row| state.view(row, viewer_id)))
    }

    async fn find_post(&self, post_id: PostId) -> Result<Option<PostRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).map(|p| PostRecord {
            id: p.id,
            author_id: p.author_id,
            facility_id: p.facility_id,
            content: p.content.clone(),
        }))
    }

    async fn insert_post(&self, post: NewPost) -> Result<PostId, AppError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&post.author_id) {
            return Err(AppError::NotFound("Referenced record not found".to_string()));
        }

        state.next_post_id += 1;
        let id = state.next_post_id;
        let now = state.now();
        state.posts.insert(
            id,
            PostRow {
                id,
                author_id: post.author_id,
                facility_id: post.facility_id,
                content: post.content,
                image_url: post.image_url,
                likes_count: 0,
                comments_count: 0,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_post_content(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let now = state.now();
        match state.posts.get_mut(&post_id) {
            Some(row) if row.author_id == author_id => {
                row.content = content.to_string();
                row.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_post(&self, post_id: PostId, author_id: UserId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        match state.posts.get(&post_id) {
            Some(row) if row.author_id == author_id => {}
            _ => return Ok(false),
        }
        state.posts.remove(&post_id);
        state.comments.retain(|c| c.post_id != post_id);
        state.likes.retain(|(p, _)| *p != post_id);
        Ok(true)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        let state = self.state.read().await;
        let mut rows: Vec<&CommentRow> =
            state.comments.iter().filter(|c| c.post_id == post_id).collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Ok(rows
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                post_id: c.post_id,
                author: state.author(c.author_id),
                content: c.content.clone(),
                created_at: c.created_at,
            })
            .collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentId, AppError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&comment.author_id) || !state.posts.contains_key(&comment.post_id)
        {
            return Err(AppError::NotFound("Referenced record not found".to_string()));
        }

        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let now = state.now();
        state.comments.push(CommentRow {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: now,
        });
        if let Some(post) = state.posts.get_mut(&comment.post_id) {
            post.comments_count += 1;
        }
        Ok(id)
    }

    async fn insert_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) || !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound("Referenced record not found".to_string()));
        }
        if !state.likes.insert((post_id, user_id)) {
            return Ok(false);
        }
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.likes_count += 1;
        }
        Ok(true)
    }

    async fn delete_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.likes.remove(&(post_id, user_id)) {
            return Ok(false);
        }
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.likes_count = (post.likes_count - 1).max(0);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_users() {
        let users = parse_seed_users("1:Dr. Ada:10; 2:Nurse Bo:20;").unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].display_name, "Dr. Ada");
        assert_eq!(users[1].facility_id, 20);
        assert!(parse_seed_users("").unwrap().is_empty());
        assert!(parse_seed_users("x:Ada:1").is_err());
    }

    #[tokio::test]
    async fn cascade_removes_comments_and_likes() {
        let store = MemoryStore::new();
        store
            .add_user(User { id: 1, display_name: "Ada".into(), facility_id: 1 })
            .await;
        let post_id = store
            .insert_post(NewPost {
                author_id: 1,
                facility_id: 1,
                content: "hello".into(),
                image_url: None,
            })
            .await
            .unwrap();
        store
            .insert_comment(NewComment { post_id, author_id: 1, content: "hi".into() })
            .await
            .unwrap();
        assert!(store.insert_like(post_id, 1).await.unwrap());

        assert!(store.delete_post(post_id, 1).await.unwrap());
        assert_eq!(store.comment_fact_count(post_id).await, 0);
        assert_eq!(store.like_fact_count(post_id).await, 0);
        assert!(store.find_post(post_id).await.unwrap().is_none());
    }
}
