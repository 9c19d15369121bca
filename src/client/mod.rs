// src/client/mod.rs

pub mod api;
pub mod feed_view;
pub mod http;
pub mod reconciler;

pub use api::{FeedApi, LocalFeedApi};
pub use feed_view::{EditOutcome, FeedView, LikeTicket, Notice, PostEntry};
pub use http::HttpFeedClient;
pub use reconciler::{LikeAction, LikeState, Reconciled};
