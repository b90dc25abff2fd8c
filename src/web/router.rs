//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_gallery, delete_gallery, delete_image, get_gallery, list_galleries, rename_gallery,
    upload_image, AppState,
};
use super::middleware::create_cors_layer;
use crate::config::WebConfig;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let gallery_routes = Router::new()
        .route("/gallery", get(list_galleries).post(create_gallery))
        .route(
            "/gallery/:path",
            get(get_gallery)
                .post(upload_image)
                .put(rename_gallery)
                .delete(delete_gallery),
        )
        .route("/gallery/:path/:file", delete(delete_image));

    gallery_routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(DefaultBodyLimit::max(config.max_upload_size_bytes())),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
