//! Mapping between gallery identifiers and filesystem paths.

use std::path::{Component, Path, PathBuf};

use crate::{GalleryError, Result};

/// Translates slugs and filenames into paths under a fixed storage root.
///
/// ```text
/// {root}/
/// ├── Trip/
/// │   ├── beach.jpg
/// │   └── sunset.png
/// ├── Home/
/// └── .uploads/      (files still being received)
/// ```
///
/// Every slug and filename must be exactly one normal path component, so no
/// mapped path can leave `root`.
#[derive(Debug, Clone)]
pub struct PathMapper {
    root: PathBuf,
}

impl PathMapper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory backing the gallery `slug`.
    pub fn gallery_dir(&self, slug: &str) -> Result<PathBuf> {
        let slug = validate_segment("gallery name", slug)?;
        Ok(self.root.join(slug))
    }

    /// File backing the image `filename` in gallery `slug`.
    pub fn image_path(&self, slug: &str, filename: &str) -> Result<PathBuf> {
        let dir = self.gallery_dir(slug)?;
        let filename = validate_segment("filename", filename)?;
        Ok(dir.join(filename))
    }

    /// Directory holding uploads that have not been registered yet.
    ///
    /// Hidden, so it is never mistaken for a gallery.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }
}

const STAGING_DIR: &str = ".uploads";

/// Check that `value` names a single entry directly inside its parent.
///
/// Rejects empty names, `.`/`..`, anything containing a separator, control
/// characters, and hidden names (leading `.`).
pub fn validate_segment<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let invalid = |reason: &str| GalleryError::BadRequest(format!("invalid {what} {value:?}: {reason}"));

    if value.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(invalid("must not contain path separators"));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    if value.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }

    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(invalid("must be a single path component")),
    }
}
