use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        post::{CreatePostRequest, PostListParams, UpdatePostRequest},
        user::Identity,
    },
    repository::FeedRepository,
};

/// Create a new post in the caller's facility.
pub async fn create_post(
    State(feed): State<FeedRepository>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post_id = feed
        .create_post(&identity, &payload.content, payload.image_url.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": post_id})),
    ))
}

/// List posts of the caller's facility (newest first, offset pagination).
pub async fn list_posts(
    State(feed): State<FeedRepository>,
    State(config): State<Config>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(config.default_page_size);

    let posts = feed.list_posts(&identity, page, page_size).await?;

    Ok(Json(posts))
}

/// Get a single post by ID.
pub async fn get_post(
    State(feed): State<FeedRepository>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = feed.get_post(&identity, id).await?;

    Ok(Json(post))
}

/// Edit a post.
/// Requires: Author.
pub async fn update_post(
    State(feed): State<FeedRepository>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    feed.update_post(&identity, id, &payload.content).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a post together with its comments and likes.
/// Requires: Author.
pub async fn delete_post(
    State(feed): State<FeedRepository>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    feed.delete_post(&identity, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
