// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{community, interaction, media},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Every `/api` route resolves the caller's identity first.
/// * Uploaded files are served read-only under `/media`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let post_routes = Router::new()
        .route("/", get(community::list_posts).post(community::create_post))
        .route(
            "/{id}",
            get(community::get_post)
                .put(community::update_post)
                .delete(community::delete_post),
        )
        .route(
            "/{id}/comments",
            get(interaction::list_comments).post(interaction::create_comment),
        )
        .route(
            "/{id}/like",
            post(interaction::like_post).delete(interaction::unlike_post),
        );

    // Leave headroom over the cap so oversized files reach the uploader and get a clear error.
    let media_routes = Router::new()
        .route("/", post(media::upload_media))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes + 1024 * 1024));

    let api_routes = Router::new()
        .nest("/posts", post_routes)
        .nest("/media", media_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
