//! Repair pass bringing the index back in line with the gallery tree.
//!
//! The directory tree wins:
//!
//! 1. **Missing gallery**: slug in the index, no directory → entry pruned.
//! 2. **Missing image**: image in the index, no file → entry pruned.
//! 3. **Untracked directory**: directory under the root, not in the index →
//!    adopted as a gallery, its files adopted as images.
//! 4. **Untracked file**: file in a gallery directory, not in the index →
//!    adopted as an image with its current modification time.
//!
//! Hidden entries and names the path mapper would reject are ignored.

use std::path::Path;

use tracing::{info, warn};

use super::model::{Gallery, Image};
use super::paths::validate_segment;
use super::service::GalleryService;
use crate::{GalleryError, Result};

/// Counts of what a reconciliation pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub pruned_galleries: usize,
    pub pruned_images: usize,
    pub adopted_galleries: usize,
    pub adopted_images: usize,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        self.pruned_galleries + self.pruned_images + self.adopted_galleries + self.adopted_images
            > 0
    }
}

impl GalleryService {
    /// Rebuild the index from the gallery tree.
    ///
    /// Runs under the mutation lock and saves the index only when something
    /// changed.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let store = self.store.write().await;
        let mut index = store.load()?;
        let mut report = ReconcileReport::default();

        let root = self.paths.root();
        let dirs: Vec<String> = match self.fs.list_dirs(root) {
            Ok(dirs) => dirs
                .into_iter()
                .filter(|d| validate_segment("gallery name", d).is_ok())
                .collect(),
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                return Err(GalleryError::Unavailable(format!(
                    "cannot scan {}: {e}",
                    root.display()
                )))
            }
        };

        index.galleries_mut().retain(|gallery| {
            let present = dirs.contains(&gallery.slug);
            if !present {
                warn!(slug = %gallery.slug, "Pruning gallery without a directory");
                report.pruned_galleries += 1;
            }
            present
        });

        for gallery in index.galleries_mut().iter_mut() {
            let dir = self.paths.gallery_dir(&gallery.slug)?;
            let files = self.scan_files(&dir)?;

            gallery.images.retain(|image| {
                let present = files.contains(&image.filename);
                if !present {
                    warn!(fullpath = %image.fullpath, "Pruning image without a file");
                    report.pruned_images += 1;
                }
                present
            });

            for filename in files {
                if !gallery.has_image(&filename) {
                    let image = self.adopt_image(&gallery.slug, &dir, filename)?;
                    gallery.images.push(image);
                    report.adopted_images += 1;
                }
            }
        }

        for name in dirs {
            if index.find(&name).is_some() {
                continue;
            }

            let dir = self.paths.gallery_dir(&name)?;
            let mut gallery = Gallery::new(name.as_str());
            for filename in self.scan_files(&dir)? {
                let image = self.adopt_image(&gallery.slug, &dir, filename)?;
                gallery.images.push(image);
                report.adopted_images += 1;
            }

            info!(slug = %gallery.slug, "Adopting untracked gallery directory");
            index.push(gallery);
            report.adopted_galleries += 1;
        }

        if report.has_changes() {
            store.save(&index)?;
            info!(
                pruned_galleries = report.pruned_galleries,
                pruned_images = report.pruned_images,
                adopted_galleries = report.adopted_galleries,
                adopted_images = report.adopted_images,
                "Index reconciled with the gallery tree"
            );
        } else {
            info!("Index and gallery tree already agree");
        }

        Ok(report)
    }

    fn scan_files(&self, dir: &Path) -> Result<Vec<String>> {
        match self.fs.list_files(dir) {
            Ok(files) => Ok(files
                .into_iter()
                .filter(|f| validate_segment("filename", f).is_ok())
                .collect()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(GalleryError::Unavailable(format!(
                "cannot scan {}: {e}",
                dir.display()
            ))),
        }
    }

    fn adopt_image(&self, slug: &str, dir: &Path, filename: String) -> Result<Image> {
        let modified_at = self
            .fs
            .modified(&dir.join(&filename))
            .map_err(|e| GalleryError::Unavailable(e.to_string()))?;

        Ok(Image::new(slug, filename, modified_at))
    }
}
