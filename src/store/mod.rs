// src/store/mod.rs

//! Storage seam for the feed.
//!
//! Implementations own atomicity: a like/comment fact and the counter that
//! summarizes it change together or not at all, and deleting a post removes
//! its comments and likes in the same unit. Repositories never issue
//! separate counter updates.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentId, NewComment},
        post::{NewPost, PageWindow, Post, PostId, PostRecord},
        user::{FacilityId, UserId},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Posts of one facility, newest first, with the viewer's like flag.
    async fn list_posts(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        window: PageWindow,
    ) -> Result<Vec<Post>, AppError>;

    /// A single post, only if it belongs to `facility_id`.
    async fn get_post(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        post_id: PostId,
    ) -> Result<Option<Post>, AppError>;

    /// Ownership and tenancy columns of a post.
    async fn find_post(&self, post_id: PostId) -> Result<Option<PostRecord>, AppError>;

    async fn insert_post(&self, post: NewPost) -> Result<PostId, AppError>;

    /// Replaces content when `author_id` owns the post. Returns whether a row changed.
    async fn update_post_content(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> Result<bool, AppError>;

    /// Deletes the post with its comments and likes when `author_id` owns it.
    async fn delete_post(&self, post_id: PostId, author_id: UserId) -> Result<bool, AppError>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError>;

    /// Inserts the comment and bumps `comments_count` atomically.
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentId, AppError>;

    /// Inserts the like fact and bumps `likes_count` atomically.
    /// Returns `false` when the fact already existed (counter untouched).
    async fn insert_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError>;

    /// Removes the like fact and decrements `likes_count` atomically.
    /// Returns `false` when there was nothing to remove.
    async fn delete_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError>;
}
