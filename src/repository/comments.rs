use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentId, MAX_COMMENT_CHARS, NewComment},
        post::{PostId, prepare_content},
        user::Identity,
    },
    repository::visible_post,
    store::SocialStore,
};

/// Comments under posts of the caller's facility.
///
/// Listing is unbounded; comment volumes per post are small enough that no
/// page size has been needed.
#[derive(Clone)]
pub struct CommentRepository {
    store: Arc<dyn SocialStore>,
}

impl CommentRepository {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Oldest first.
    pub async fn list_comments(
        &self,
        caller: &Identity,
        post_id: PostId,
    ) -> Result<Vec<Comment>, AppError> {
        visible_post(self.store.as_ref(), caller, post_id).await?;
        self.store.list_comments(post_id).await
    }

    /// The store bumps `comments_count` in the same unit as the insert.
    pub async fn create_comment(
        &self,
        caller: &Identity,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentId, AppError> {
        let content = prepare_content(content, MAX_COMMENT_CHARS)?;
        visible_post(self.store.as_ref(), caller, post_id).await?;

        self.store
            .insert_comment(NewComment {
                post_id,
                author_id: caller.user_id,
                content,
            })
            .await
    }
}
