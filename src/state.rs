use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::repository::{CommentRepository, FeedRepository, LikeLedger};
use crate::store::SocialStore;
use crate::utils::media::MediaUploader;

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedRepository,
    pub comments: CommentRepository,
    pub likes: LikeLedger,
    pub media: Arc<dyn MediaUploader>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn SocialStore>, media: Arc<dyn MediaUploader>, config: Config) -> Self {
        Self {
            feed: FeedRepository::new(store.clone()),
            comments: CommentRepository::new(store.clone()),
            likes: LikeLedger::new(store),
            media,
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for FeedRepository {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}

impl FromRef<AppState> for CommentRepository {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for LikeLedger {
    fn from_ref(state: &AppState) -> Self {
        state.likes.clone()
    }
}
