use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentId},
        post::{Post, PostId},
        user::Identity,
    },
    repository::{CommentRepository, FeedRepository, LikeLedger},
    utils::media::MediaUploader,
};

/// The feed operations as seen by one signed-in client.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn list_posts(&self, page: i64, page_size: i64) -> Result<Vec<Post>, AppError>;
    async fn create_post(&self, content: &str, image_url: Option<&str>) -> Result<PostId, AppError>;
    async fn update_post(&self, post_id: PostId, content: &str) -> Result<(), AppError>;
    async fn delete_post(&self, post_id: PostId) -> Result<(), AppError>;
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError>;
    async fn create_comment(&self, post_id: PostId, content: &str) -> Result<CommentId, AppError>;
    async fn like(&self, post_id: PostId) -> Result<(), AppError>;
    async fn unlike(&self, post_id: PostId) -> Result<(), AppError>;
    async fn upload_media(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;
}

/// `FeedApi` that calls the repositories in-process for one identity.
#[derive(Clone)]
pub struct LocalFeedApi {
    identity: Identity,
    feed: FeedRepository,
    comments: CommentRepository,
    likes: LikeLedger,
    media: Arc<dyn MediaUploader>,
}

impl LocalFeedApi {
    pub fn new(
        identity: Identity,
        feed: FeedRepository,
        comments: CommentRepository,
        likes: LikeLedger,
        media: Arc<dyn MediaUploader>,
    ) -> Self {
        Self {
            identity,
            feed,
            comments,
            likes,
            media,
        }
    }

    pub fn from_state(state: &crate::state::AppState, identity: Identity) -> Self {
        Self::new(
            identity,
            state.feed.clone(),
            state.comments.clone(),
            state.likes.clone(),
            state.media.clone(),
        )
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }
}

#[async_trait]
impl FeedApi for LocalFeedApi {
    async fn list_posts(&self, page: i64, page_size: i64) -> Result<Vec<Post>, AppError> {
        self.feed.list_posts(&self.identity, page, page_size).await
    }

    async fn create_post(&self, content: &str, image_url: Option<&str>) -> Result<PostId, AppError> {
        self.feed.create_post(&self.identity, content, image_url).await
    }

    async fn update_post(&self, post_id: PostId, content: &str) -> Result<(), AppError> {
        self.feed.update_post(&self.identity, post_id, content).await
    }

    async fn delete_post(&self, post_id: PostId) -> Result<(), AppError> {
        self.feed.delete_post(&self.identity, post_id).await
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        self.comments.list_comments(&self.identity, post_id).await
    }

    async fn create_comment(&self, post_id: PostId, content: &str) -> Result<CommentId, AppError> {
        self.comments
            .create_comment(&self.identity, post_id, content)
            .await
    }

    async fn like(&self, post_id: PostId) -> Result<(), AppError> {
        self.likes.like(&self.identity, post_id).await
    }

    async fn unlike(&self, post_id: PostId) -> Result<(), AppError> {
        self.likes.unlike(&self.identity, post_id).await
    }

    async fn upload_media(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        self.media.upload(bytes, content_type).await
    }
}
