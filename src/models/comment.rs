use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{
        post::PostId,
        user::{AuthorSummary, UserId},
    },
    utils::html::escape_html,
};

pub type CommentId = i64;

pub const MAX_COMMENT_CHARS: usize = 1000;

/// A comment with author info, as listed under a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: AuthorSummary,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Comment {
    pub fn content_html(&self) -> String {
        escape_html(&self.content)
    }
}

/// Insert payload handed to the store.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
}

/// DTO for creating a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
}
