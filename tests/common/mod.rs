//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use galleryd::config::StorageConfig;
use galleryd::gallery::{
    Filesystem, FsError, FsResult, GalleryService, Index, LocalFilesystem, MetadataStore,
    PathMapper,
};
use tempfile::TempDir;

/// Storage configuration rooted in `dir`.
pub fn storage_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        root: gallery_root(dir).to_string_lossy().to_string(),
        index_path: index_path(dir).to_string_lossy().to_string(),
        reconcile_on_startup: false,
    }
}

/// Absolute path of the gallery root.
pub fn gallery_root(dir: &TempDir) -> PathBuf {
    dir.path().join("galleries")
}

/// Absolute path of the index document.
pub fn index_path(dir: &TempDir) -> PathBuf {
    dir.path().join("gallery.json")
}

/// Open a service on fresh local storage.
pub fn setup_service() -> (TempDir, GalleryService) {
    let dir = TempDir::new().unwrap();
    let service = GalleryService::open(&storage_config(&dir)).unwrap();
    (dir, service)
}

/// Read the persisted index document directly.
pub fn read_index(dir: &TempDir) -> Index {
    MetadataStore::new(index_path(dir)).load().unwrap()
}

/// Filesystem that fails every mutating effect once armed, and every
/// modification-time lookup once `arm_stat` is called.
#[derive(Default)]
pub struct FailingFilesystem {
    inner: LocalFilesystem,
    armed: AtomicBool,
    stat_armed: AtomicBool,
}

impl FailingFilesystem {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn arm_stat(&self) {
        self.stat_armed.store(true, Ordering::SeqCst);
    }

    fn check(&self, op: &'static str, path: &Path) -> FsResult<()> {
        if self.armed.load(Ordering::SeqCst) {
            return Err(FsError::Failed {
                op,
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "injected"),
            });
        }
        Ok(())
    }
}

impl Filesystem for FailingFilesystem {
    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.check("mkdir", path)?;
        self.inner.create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> FsResult<()> {
        self.check("rmdir", path)?;
        self.inner.remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        self.check("unlink", path)?;
        self.inner.remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        self.check("rename", from)?;
        self.inner.rename(from, to)
    }

    fn modified(&self, path: &Path) -> FsResult<DateTime<Utc>> {
        if self.stat_armed.load(Ordering::SeqCst) {
            return Err(FsError::Failed {
                op: "stat",
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected"),
            });
        }
        self.inner.modified(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.inner.write(path, content)
    }

    fn list_dirs(&self, path: &Path) -> FsResult<Vec<String>> {
        self.inner.list_dirs(path)
    }

    fn list_files(&self, path: &Path) -> FsResult<Vec<String>> {
        self.inner.list_files(path)
    }
}

/// Open a service whose filesystem can be made to fail on demand.
pub fn setup_failing_service() -> (TempDir, GalleryService, Arc<FailingFilesystem>) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(gallery_root(&dir)).unwrap();

    let fs = Arc::new(FailingFilesystem::default());
    let service = GalleryService::new(
        MetadataStore::new(index_path(&dir)),
        PathMapper::new(gallery_root(&dir)),
        fs.clone(),
    );
    (dir, service, fs)
}
