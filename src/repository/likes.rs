use std::sync::Arc;

use crate::{
    error::AppError,
    models::{post::PostId, user::Identity},
    repository::visible_post,
    store::SocialStore,
};

/// One vote per `(post, user)`; the source of truth for `likes_count`.
#[derive(Clone)]
pub struct LikeLedger {
    store: Arc<dyn SocialStore>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Records the caller's like. An existing like is absorbed, not reported.
    pub async fn like(&self, caller: &Identity, post_id: PostId) -> Result<(), AppError> {
        visible_post(self.store.as_ref(), caller, post_id).await?;

        match self.store.insert_like(post_id, caller.user_id).await {
            Ok(true) => Ok(()),
            Ok(false) | Err(AppError::Duplicate(_)) => {
                tracing::debug!(post_id, user_id = caller.user_id, "Already liked");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the caller's like if present.
    pub async fn unlike(&self, caller: &Identity, post_id: PostId) -> Result<(), AppError> {
        visible_post(self.store.as_ref(), caller, post_id).await?;

        if !self.store.delete_like(post_id, caller.user_id).await? {
            tracing::debug!(post_id, user_id = caller.user_id, "Nothing to unlike");
        }
        Ok(())
    }
}
