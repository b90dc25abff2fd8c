//! galleryd - image gallery host
//!
//! Serves a collection of galleries, each a directory of image files, over a
//! small HTTP API. A single JSON index document is kept in step with the
//! directory tree.

pub mod config;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{ErrorKind, GalleryError, Result};
pub use gallery::{
    Gallery, GalleryDetail, GalleryService, GallerySummary, Image, IncomingFile, ReconcileReport,
    Removed,
};
pub use web::WebServer;
