use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        post::{MAX_POST_CHARS, NewPost, PageWindow, Post, PostId, prepare_content, validate_image_url},
        user::Identity,
    },
    repository::visible_post,
    store::SocialStore,
};

/// Posts of the caller's facility.
#[derive(Clone)]
pub struct FeedRepository {
    store: Arc<dyn SocialStore>,
}

impl FeedRepository {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Newest first, rows `[page * page_size, (page + 1) * page_size)`.
    /// Past the end yields an empty page.
    pub async fn list_posts(
        &self,
        caller: &Identity,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Post>, AppError> {
        let window = PageWindow::new(page, page_size);
        self.store
            .list_posts(caller.facility_id, caller.user_id, window)
            .await
    }

    pub async fn get_post(&self, caller: &Identity, post_id: PostId) -> Result<Post, AppError> {
        self.store
            .get_post(caller.facility_id, caller.user_id, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Creates a post in the caller's facility. `image_url` must already be
    /// the public URL of an uploaded file.
    pub async fn create_post(
        &self,
        caller: &Identity,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<PostId, AppError> {
        let content = prepare_content(content, MAX_POST_CHARS)?;
        let image_url = match image_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => {
                validate_image_url(url)
                    .map_err(|_| AppError::Validation("image_url must be an absolute URL".to_string()))?;
                Some(url.to_string())
            }
            None => None,
        };

        let id = self
            .store
            .insert_post(NewPost {
                author_id: caller.user_id,
                facility_id: caller.facility_id,
                content,
                image_url,
            })
            .await?;

        tracing::info!(post_id = id, facility_id = caller.facility_id, "Post created");
        Ok(id)
    }

    /// Edits the caller's own post. Empty or unchanged content is a no-op.
    pub async fn update_post(
        &self,
        caller: &Identity,
        post_id: PostId,
        content: &str,
    ) -> Result<(), AppError> {
        let post = visible_post(self.store.as_ref(), caller, post_id).await?;
        if post.author_id != caller.user_id {
            return Err(AppError::Permission(
                "You are not authorized to edit this post".to_string(),
            ));
        }

        if content.trim().is_empty() {
            return Ok(());
        }
        let content = prepare_content(content, MAX_POST_CHARS)?;
        if content == post.content {
            return Ok(());
        }

        if !self
            .store
            .update_post_content(post_id, caller.user_id, &content)
            .await?
        {
            // Deleted between the ownership check and the write.
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    /// Deletes the caller's own post; comments and likes go with it.
    pub async fn delete_post(&self, caller: &Identity, post_id: PostId) -> Result<(), AppError> {
        let post = visible_post(self.store.as_ref(), caller, post_id).await?;
        if post.author_id != caller.user_id {
            return Err(AppError::Permission(
                "You are not authorized to delete this post".to_string(),
            ));
        }

        if !self.store.delete_post(post_id, caller.user_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }
}
