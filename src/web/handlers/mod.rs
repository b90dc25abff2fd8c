//! API handlers for the galleryd Web API.

pub mod gallery;

pub use gallery::*;

use crate::gallery::GalleryService;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Gallery service.
    pub galleries: GalleryService,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(galleries: GalleryService) -> Self {
        Self { galleries }
    }
}
