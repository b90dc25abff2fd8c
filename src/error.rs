//! Error types for galleryd.

use thiserror::Error;

/// Broad classification of a [`GalleryError`].
///
/// Callers (the HTTP layer in particular) match on this instead of the
/// individual variants when deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BadRequest,
    CorruptIndex,
    Unavailable,
    Inconsistent,
}

/// Common error type for galleryd.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Referenced gallery or image is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// A gallery with the same name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing upload payload or malformed input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The persisted index document could not be parsed.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// The storage medium could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A filesystem effect failed after the index was already persisted.
    ///
    /// The index and the gallery tree have diverged; a reconciliation pass
    /// is needed to bring them back in line.
    #[error("index and filesystem diverged: {0}")]
    Inconsistent(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GalleryError {
    /// Classify this error.
    ///
    /// Raw I/O and configuration failures are reported as `Unavailable`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GalleryError::NotFound(_) => ErrorKind::NotFound,
            GalleryError::Conflict(_) => ErrorKind::Conflict,
            GalleryError::BadRequest(_) => ErrorKind::BadRequest,
            GalleryError::CorruptIndex(_) => ErrorKind::CorruptIndex,
            GalleryError::Inconsistent(_) => ErrorKind::Inconsistent,
            GalleryError::Unavailable(_) | GalleryError::Io(_) | GalleryError::Config(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

/// Result type alias for galleryd operations.
pub type Result<T> = std::result::Result<T, GalleryError>;
