//! Persistence of the gallery index as a single JSON document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::model::Index;
use crate::{GalleryError, Result};

/// Loads and saves the whole index.
///
/// There are no partial updates: every mutation loads the document, changes
/// it in memory and writes it back whole. Callers serialize mutations.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index.
    ///
    /// A missing document is an empty index.
    pub fn load(&self) -> Result<Index> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Index::default()),
            Err(e) => {
                return Err(GalleryError::Unavailable(format!(
                    "cannot read index {}: {e}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            GalleryError::CorruptIndex(format!("{}: {e}", self.path.display()))
        })
    }

    /// Replace the persisted document with `index`.
    ///
    /// The document is written to a temporary sibling and renamed over the
    /// existing file, so a concurrent `load` sees either the old or the new index.
    pub fn save(&self, index: &Index) -> Result<()> {
        let unavailable = |e: &dyn std::fmt::Display| {
            GalleryError::Unavailable(format!("cannot write index {}: {e}", self.path.display()))
        };

        let content = serde_json::to_string_pretty(index).map_err(|e| unavailable(&e))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| unavailable(&e))?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let stem = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let tmp_file = dir.join(format!(".{stem}-{}.tmp", Uuid::new_v4()));

        fs::write(&tmp_file, content).map_err(|e| unavailable(&e))?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(unavailable(&e));
        }

        Ok(())
    }
}
