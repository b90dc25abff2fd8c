//! Gallery handlers for Web API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::gallery::{GalleryDetail, GallerySummary, IMAGE_FIELD};
use crate::web::dto::{
    GalleryListResponse, GalleryNameRequest, StatusResponse, UploadResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /gallery - List all galleries.
pub async fn list_galleries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GalleryListResponse>, ApiError> {
    let galleries = state.galleries.list().await?;

    Ok(Json(GalleryListResponse { galleries }))
}

/// POST /gallery - Create a gallery.
pub async fn create_gallery(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<GalleryNameRequest>,
) -> Result<(StatusCode, Json<GallerySummary>), ApiError> {
    let summary = state.galleries.create(&req.name).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /gallery/:path - Get a gallery and its images.
pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<GalleryDetail>, ApiError> {
    let detail = state.galleries.detail(&slug).await?;

    Ok(Json(detail))
}

/// POST /gallery/:path - Upload an image.
///
/// Request body: multipart/form-data with an "image" file field. The gallery
/// is checked before the body is read; the body is received without holding
/// the storage lock.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut session = state.galleries.begin_upload(&slug).await?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let content = field.bytes().await.map_err(multipart_error)?;
        session.stage(&filename, &content)?;
        break;
    }

    let image = session.complete().await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            uploaded: vec![image],
        }),
    ))
}

/// PUT /gallery/:path - Rename a gallery.
pub async fn rename_gallery(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ValidatedJson(req): ValidatedJson<GalleryNameRequest>,
) -> Result<Json<GallerySummary>, ApiError> {
    let summary = state.galleries.rename(&slug, &req.name).await?;

    Ok(Json(summary))
}

/// DELETE /gallery/:path - Delete a gallery, or an image by its
/// URL-encoded fullpath.
pub async fn delete_gallery(
    State(state): State<Arc<AppState>>,
    Path(target): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.galleries.delete(&target).await?;

    Ok(Json(StatusResponse::ok()))
}

/// DELETE /gallery/:path/:file - Delete an image.
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path((slug, filename)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .galleries
        .delete(&format!("{slug}/{filename}"))
        .await?;

    Ok(Json(StatusResponse::ok()))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("File too large");
    }
    tracing::warn!("Failed to read multipart body: {}", e);
    ApiError::bad_request("file not found")
}
