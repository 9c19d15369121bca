// src/repository/mod.rs

pub mod comments;
pub mod feed;
pub mod likes;

pub use comments::CommentRepository;
pub use feed::FeedRepository;
pub use likes::LikeLedger;

use crate::{
    error::AppError,
    models::{post::{PostId, PostRecord}, user::Identity},
    store::SocialStore,
};

/// Loads a post for a mutation, hiding posts of other facilities as not found.
pub(crate) async fn visible_post(
    store: &dyn SocialStore,
    caller: &Identity,
    post_id: PostId,
) -> Result<PostRecord, AppError> {
    store
        .find_post(post_id)
        .await?
        .filter(|p| p.facility_id == caller.facility_id)
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}
