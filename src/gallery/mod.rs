//! Gallery storage for galleryd.
//!
//! A gallery is a directory directly under the storage root holding image
//! files; the index is one JSON document listing every gallery and image.
//! This module keeps the two in step:
//! - `model`: galleries, images and the index
//! - `paths`: slug/filename to path mapping with traversal checks
//! - `store`: whole-document load and atomic save of the index
//! - `fs`: filesystem effects, "not found" reported apart from failures
//! - `service`: list, create, detail, upload, rename, delete
//! - `reconcile`: opt-in repair of index/filesystem divergence

mod fs;
mod model;
mod paths;
mod reconcile;
mod service;
mod store;

pub use fs::{Filesystem, FsError, FsResult, LocalFilesystem};
pub use model::{display_name, fullpath, Gallery, GalleryDetail, GallerySummary, Image, Index};
pub use paths::{validate_segment, PathMapper};
pub use reconcile::ReconcileReport;
pub use service::{GalleryService, IncomingFile, Removed, UploadSession};
pub use store::MetadataStore;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Maximum length for a gallery name (in characters).
pub const MAX_GALLERY_NAME_LENGTH: usize = 255;
