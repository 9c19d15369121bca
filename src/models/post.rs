use serde::{Deserialize, Serialize};
use validator::Validate;
use url::Url;

use crate::{
    error::AppError,
    models::user::{AuthorSummary, FacilityId, UserId},
    utils::html::escape_html,
};

pub type PostId = i64;

pub const MAX_POST_CHARS: usize = 5000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A post as listed to a facility member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub image_url: Option<String>,
    pub author: AuthorSummary,
    pub facility_id: FacilityId,

    // Maintained by the store alongside the facts they count.
    pub likes_count: i32,
    pub comments_count: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    /// Whether the caller currently likes this post.
    #[serde(default)]
    pub liked_by_me: bool,
}

impl Post {
    /// `content` escaped for an HTML view.
    pub fn content_html(&self) -> String {
        escape_html(&self.content)
    }
}

/// The columns needed to authorize a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: PostId,
    pub author_id: UserId,
    pub facility_id: FacilityId,
    pub content: String,
}

/// Insert payload handed to the store once content has been validated.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: UserId,
    pub facility_id: FacilityId,
    pub content: String,
    pub image_url: Option<String>,
}

/// DTO for creating a new post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content length must be between 1 and 5000 chars"
    ))]
    pub content: String,

    /// Public URL returned by the media upload endpoint.
    #[validate(length(max = 500), custom(function = validate_image_url))]
    pub image_url: Option<String>,
}

/// DTO for editing a post. Empty content is treated as "no change".
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(max = 5000, message = "Content must be at most 5000 chars"))]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    /// Zero-based page number.
    pub page: Option<i64>,

    /// Number of items per page (default from config, max 100).
    pub page_size: Option<i64>,
}

/// Offset window `[page * page_size, (page + 1) * page_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn new(page: i64, page_size: i64) -> Self {
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        let page = page.max(0);
        Self {
            offset: page.saturating_mul(limit),
            limit,
        }
    }
}

/// Trims post or comment text and rejects it when empty or too long.
/// The text is otherwise stored as given.
pub fn prepare_content(raw: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "content must be at most {} characters",
            max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates that an image reference is an absolute http(s) URL.
pub fn validate_image_url(url: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_url")),
    }
}
