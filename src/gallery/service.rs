//! Gallery service.
//!
//! Every operation follows the same shape against a freshly loaded index:
//! load, validate, save, then apply the filesystem effect. Mutations hold the
//! write half of one process-wide lock for the whole cycle, so two requests
//! can never interleave their load and save. Reads take the read half.
//! Uploads receive their bytes with no lock held and take the write half
//! only to register the finished file.
//!
//! Filesystem effects are not transactional with the index write. When an
//! effect fails after the index was saved, the operation returns
//! [`GalleryError::Inconsistent`] and the two halves stay diverged until
//! [`GalleryService::reconcile`] is run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::fs::{Filesystem, FsError, LocalFilesystem};
use super::model::{fullpath, Gallery, GalleryDetail, GallerySummary, Image};
use super::paths::PathMapper;
use super::store::MetadataStore;
use crate::config::StorageConfig;
use crate::{GalleryError, Result};

/// A file handed over by the upload transport.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Original filename, stored as-is.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

/// What a delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    Gallery(GallerySummary),
    Image(Image),
}

/// Gallery service keeping the index and the gallery tree in step.
#[derive(Clone)]
pub struct GalleryService {
    pub(super) store: Arc<RwLock<MetadataStore>>,
    pub(super) paths: PathMapper,
    pub(super) fs: Arc<dyn Filesystem>,
}

impl GalleryService {
    /// Create a new GalleryService.
    pub fn new(store: MetadataStore, paths: PathMapper, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            paths,
            fs,
        }
    }

    /// Open the local gallery storage described by `config`.
    ///
    /// The storage root is created if it doesn't exist.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.root)?;

        Ok(Self::new(
            MetadataStore::new(&config.index_path),
            PathMapper::new(&config.root),
            Arc::new(LocalFilesystem),
        ))
    }

    pub fn paths(&self) -> &PathMapper {
        &self.paths
    }

    /// List every gallery in index order.
    pub async fn list(&self) -> Result<Vec<GallerySummary>> {
        let store = self.store.read().await;
        let index = store.load()?;

        Ok(index.galleries().iter().map(Gallery::summary).collect())
    }

    /// Get a gallery and its images.
    pub async fn detail(&self, slug: &str) -> Result<GalleryDetail> {
        let store = self.store.read().await;
        let index = store.load()?;

        index
            .find(slug)
            .map(Gallery::detail)
            .ok_or_else(|| gallery_not_found(slug))
    }

    /// Create an empty gallery named `name`.
    ///
    /// # Errors
    /// - `BadRequest` if `name` cannot be used as a directory name
    /// - `Conflict` if a gallery is already addressed by `name`
    /// - `Inconsistent` if the directory cannot be created after the save
    pub async fn create(&self, name: &str) -> Result<GallerySummary> {
        let dir = self.paths.gallery_dir(name)?;

        let store = self.store.write().await;
        let mut index = store.load()?;

        if index.name_taken(name, None) {
            return Err(GalleryError::Conflict(format!(
                "gallery {name} already exists"
            )));
        }

        let gallery = Gallery::new(name);
        let summary = gallery.summary();
        index.push(gallery);
        store.save(&index)?;

        self.fs
            .create_dir_all(&dir)
            .map_err(|e| diverged("creating the gallery directory", e))?;

        info!(slug = %summary.slug, "Gallery created");
        Ok(summary)
    }

    /// Start an upload into gallery `slug`.
    ///
    /// Fails with `NotFound` before anything is written if the gallery does
    /// not exist. Only the read lock is taken, and only for the check: the
    /// transfer itself runs with no lock held.
    pub async fn begin_upload(&self, slug: &str) -> Result<UploadSession> {
        let index = self.store.read().await.load()?;

        let gallery = index.find(slug).ok_or_else(|| gallery_not_found(slug))?;
        self.paths.gallery_dir(slug)?;

        Ok(UploadSession {
            store: Arc::clone(&self.store),
            slug: slug.to_string(),
            known: gallery.images.iter().map(|i| i.filename.clone()).collect(),
            paths: self.paths.clone(),
            fs: Arc::clone(&self.fs),
            staged: None,
        })
    }

    /// Store `file` in gallery `slug` and register it.
    ///
    /// `None` models a request that carried no file payload.
    pub async fn upload(&self, slug: &str, file: Option<IncomingFile>) -> Result<Image> {
        let mut session = self.begin_upload(slug).await?;

        if let Some(file) = file {
            session.stage(&file.filename, &file.content)?;
        }
        session.complete().await
    }

    /// Rename gallery `slug` to `new_name`.
    ///
    /// Slug and name both become `new_name` and every image fullpath is
    /// re-pointed before the directory is moved.
    pub async fn rename(&self, slug: &str, new_name: &str) -> Result<GallerySummary> {
        let new_dir = self.paths.gallery_dir(new_name)?;

        let store = self.store.write().await;
        let mut index = store.load()?;

        let position = index.position(slug).ok_or_else(|| gallery_not_found(slug))?;
        if index.name_taken(new_name, Some(position)) {
            return Err(GalleryError::Conflict(format!(
                "gallery {new_name} already exists"
            )));
        }
        let old_dir = self.paths.gallery_dir(slug)?;

        let gallery = &mut index.galleries_mut()[position];
        gallery.rename(new_name);
        let summary = gallery.summary();
        store.save(&index)?;

        if old_dir != new_dir {
            self.fs
                .rename(&old_dir, &new_dir)
                .map_err(|e| diverged("moving the gallery directory", e))?;
        }

        info!(from = %slug, to = %summary.slug, "Gallery renamed");
        Ok(summary)
    }

    /// Delete a gallery (by slug) or a single image (by fullpath).
    ///
    /// A gallery slug match wins over an image fullpath match.
    pub async fn delete(&self, target: &str) -> Result<Removed> {
        let store = self.store.write().await;
        let mut index = store.load()?;

        if let Some(position) = index.position(target) {
            let dir = self.paths.gallery_dir(target)?;
            let gallery = index.remove(position);
            store.save(&index)?;

            tolerate_missing(self.fs.remove_dir_all(&dir))
                .map_err(|e| diverged("removing the gallery directory", e))?;

            info!(slug = %gallery.slug, images = gallery.images.len(), "Gallery deleted");
            return Ok(Removed::Gallery(gallery.summary()));
        }

        if let Some((gi, ii)) = index.locate_image(target) {
            let gallery = &mut index.galleries_mut()[gi];
            let path = self
                .paths
                .image_path(&gallery.slug, &gallery.images[ii].filename)?;
            let image = gallery.images.remove(ii);
            store.save(&index)?;

            tolerate_missing(self.fs.remove_file(&path))
                .map_err(|e| diverged("removing the image file", e))?;

            info!(fullpath = %image.fullpath, "Image deleted");
            return Ok(Removed::Image(image));
        }

        Err(GalleryError::NotFound(format!("directory/file {target}")))
    }
}

/// An upload in progress.
///
/// Received bytes are parked under the hidden staging directory and only
/// moved into the gallery by [`UploadSession::complete`], under the
/// mutation lock. A session dropped before completing removes whatever it
/// staged.
pub struct UploadSession {
    store: Arc<RwLock<MetadataStore>>,
    slug: String,
    /// Filenames the gallery held when the upload began.
    known: Vec<String>,
    paths: PathMapper,
    fs: Arc<dyn Filesystem>,
    staged: Option<Staged>,
}

struct Staged {
    filename: String,
    temp: PathBuf,
}

impl UploadSession {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Filename staged so far, if any.
    pub fn staged_filename(&self) -> Option<&str> {
        self.staged.as_ref().map(|s| s.filename.as_str())
    }

    /// Receive `content` as `filename`.
    ///
    /// Names already taken when the upload began are refused here, before
    /// anything is written. Nothing is visible in the gallery until
    /// [`UploadSession::complete`].
    pub fn stage(&mut self, filename: &str, content: &[u8]) -> Result<()> {
        if self.staged.is_some() {
            return Err(GalleryError::BadRequest(
                "only one file per upload".to_string(),
            ));
        }
        self.paths.image_path(&self.slug, filename)?;
        if self.known.iter().any(|f| f == filename) {
            return Err(duplicate_image(&self.slug, filename));
        }

        let staging = self.paths.staging_dir();
        self.fs
            .create_dir_all(&staging)
            .map_err(|e| GalleryError::Unavailable(format!("cannot stage upload: {e}")))?;

        let temp = staging.join(format!("{}.part", Uuid::new_v4()));
        if let Err(e) = self.fs.write(&temp, content) {
            discard(self.fs.as_ref(), &temp);
            return Err(GalleryError::Unavailable(format!("cannot stage upload: {e}")));
        }

        self.staged = Some(Staged {
            filename: filename.to_string(),
            temp,
        });
        Ok(())
    }

    /// Move the staged file into the gallery and register it.
    ///
    /// Takes the mutation lock and re-checks against a fresh index: the
    /// gallery may have been renamed or deleted, or the name taken, while
    /// the bytes were arriving. On any failure neither the staged file nor
    /// a half-registered image is left behind.
    pub async fn complete(mut self) -> Result<Image> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| GalleryError::BadRequest("zero files uploaded".to_string()))?;

        let store = self.store.write().await;
        let result = self.register(&store, &staged);
        if result.is_err() {
            discard(self.fs.as_ref(), &staged.temp);
        }
        result
    }

    fn register(&self, store: &MetadataStore, staged: &Staged) -> Result<Image> {
        let mut index = store.load()?;
        let position = index
            .position(&self.slug)
            .ok_or_else(|| gallery_not_found(&self.slug))?;

        let filename = &staged.filename;
        let path = self.paths.image_path(&self.slug, filename)?;
        if index.galleries()[position].has_image(filename) || self.fs.modified(&path).is_ok() {
            return Err(duplicate_image(&self.slug, filename));
        }

        self.fs
            .rename(&staged.temp, &path)
            .map_err(|e| GalleryError::Unavailable(format!("cannot store upload: {e}")))?;

        let registered = self
            .fs
            .modified(&path)
            .map_err(|e| GalleryError::Unavailable(e.to_string()))
            .and_then(|modified_at| {
                let image = Image::new(&self.slug, filename.clone(), modified_at);
                index.galleries_mut()[position].images.push(image.clone());
                store.save(&index)?;
                Ok(image)
            });

        match registered {
            Ok(image) => {
                info!(fullpath = %image.fullpath, "Image uploaded");
                Ok(image)
            }
            Err(e) => {
                discard(self.fs.as_ref(), &path);
                Err(e)
            }
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if let Some(staged) = self.staged.take() {
            discard(self.fs.as_ref(), &staged.temp);
        }
    }
}

fn gallery_not_found(slug: &str) -> GalleryError {
    GalleryError::NotFound(format!("gallery {slug}"))
}

fn duplicate_image(slug: &str, filename: &str) -> GalleryError {
    GalleryError::Conflict(format!("image {} already exists", fullpath(slug, filename)))
}

/// Remove a file that must not outlive a failed upload.
fn discard(fs: &dyn Filesystem, path: &Path) {
    match fs.remove_file(path) {
        Ok(()) | Err(FsError::NotFound(_)) => {}
        Err(e) => warn!(error = %e, "Could not remove abandoned upload"),
    }
}

/// Treat an effect whose target is already gone as done.
fn tolerate_missing(result: std::result::Result<(), FsError>) -> std::result::Result<(), FsError> {
    match result {
        Err(FsError::NotFound(path)) => {
            warn!(path = %path.display(), "Nothing to remove, already missing on disk");
            Ok(())
        }
        other => other,
    }
}

/// Report a filesystem effect that failed after the index was saved.
fn diverged(effect: &str, err: FsError) -> GalleryError {
    error!(error = %err, "{effect} failed after the index was saved");
    GalleryError::Inconsistent(format!("{effect}: {err}"))
}
