//! Filesystem effects for gallery storage.
//!
//! The service never touches the gallery tree directly; it goes through a
//! [`Filesystem`] so "not found" can be told apart from real failures, and so
//! tests can substitute a gateway that fails on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of a single filesystem effect.
#[derive(Error, Debug)]
pub enum FsError {
    /// The path the effect operates on does not exist.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Any other failure.
    #[error("{op} {} failed: {source}", .path.display())]
    Failed {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    fn from_io(op: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FsError::NotFound(path.to_path_buf())
        } else {
            FsError::Failed {
                op,
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

/// Result type alias for filesystem effects.
pub type FsResult<T> = std::result::Result<T, FsError>;

/// Directory and file operations used by the gallery service.
pub trait Filesystem: Send + Sync {
    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> FsResult<()>;

    /// Move `from` to `to`. Fails if `to` already exists.
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Last modification time of `path`.
    fn modified(&self, path: &Path) -> FsResult<DateTime<Utc>>;

    /// Write `content` to `path`, replacing any existing file.
    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    /// Names of the sub-directories of `path`, sorted.
    fn list_dirs(&self, path: &Path) -> FsResult<Vec<String>>;

    /// Names of the regular files in `path`, sorted.
    fn list_files(&self, path: &Path) -> FsResult<Vec<String>>;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    fn list_entries(&self, path: &Path, want_dirs: bool) -> FsResult<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| FsError::from_io("read_dir", path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io("read_dir", path, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| FsError::from_io("stat", &entry.path(), e))?;
            let wanted = if want_dirs {
                file_type.is_dir()
            } else {
                file_type.is_file()
            };
            if !wanted {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        fs::create_dir_all(path).map_err(|e| FsError::from_io("mkdir", path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> FsResult<()> {
        fs::remove_dir_all(path).map_err(|e| FsError::from_io("rmdir", path, e))
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        fs::remove_file(path).map_err(|e| FsError::from_io("unlink", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        if to.exists() {
            return Err(FsError::Failed {
                op: "rename",
                path: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
            });
        }
        fs::rename(from, to).map_err(|e| FsError::from_io("rename", from, e))
    }

    fn modified(&self, path: &Path) -> FsResult<DateTime<Utc>> {
        let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat", path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| FsError::from_io("stat", path, e))?;
        Ok(modified.into())
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        fs::write(path, content).map_err(|e| FsError::from_io("write", path, e))
    }

    fn list_dirs(&self, path: &Path) -> FsResult<Vec<String>> {
        self.list_entries(path, true)
    }

    fn list_files(&self, path: &Path) -> FsResult<Vec<String>> {
        self.list_entries(path, false)
    }
}
