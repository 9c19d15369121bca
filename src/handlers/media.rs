use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use crate::{error::AppError, models::user::Identity, state::AppState};

/// Upload an image; the body is the raw file and `Content-Type` its type.
/// Returns the public URL to pass as `image_url` when creating a post.
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Upload("missing content type".to_string()))?;

    let url = state.media.upload(body.to_vec(), content_type).await?;
    tracing::info!(user_id = identity.user_id, %url, "Media uploaded");

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "url": url }))))
}
