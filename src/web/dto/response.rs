//! Response DTOs for Web API.

use serde::Serialize;

use crate::gallery::{GallerySummary, Image};

/// Response for `GET /gallery`.
#[derive(Debug, Serialize)]
pub struct GalleryListResponse {
    pub galleries: Vec<GallerySummary>,
}

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: Vec<Image>,
}

/// Response for a successful delete.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
