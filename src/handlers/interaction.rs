use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{comment::CreateCommentRequest, user::Identity},
    repository::{CommentRepository, LikeLedger},
};

/// Like a post. Liking twice is not an error.
pub async fn like_post(
    State(likes): State<LikeLedger>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    likes.like(&identity, post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove the caller's like. Unliking a post that is not liked is not an error.
pub async fn unlike_post(
    State(likes): State<LikeLedger>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    likes.unlike(&identity, post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create a new comment.
pub async fn create_comment(
    State(comments): State<CommentRepository>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_id = comments
        .create_comment(&identity, post_id, &payload.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": new_id })),
    ))
}

/// List all comments for a post, oldest first.
pub async fn list_comments(
    State(comments): State<CommentRepository>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comments = comments.list_comments(&identity, post_id).await?;

    Ok(Json(comments))
}
