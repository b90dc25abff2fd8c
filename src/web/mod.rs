//! Web API module for galleryd.
//!
//! This module exposes the gallery service over HTTP: listing and creating
//! galleries, uploading images, renaming and deleting.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
