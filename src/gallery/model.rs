//! Gallery index data model.
//!
//! Field names on the wire (`path`, `name`, `modified`) follow the layout of
//! the persisted `gallery.json` document, so an existing index can be loaded
//! as-is.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single image registered under a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Leaf name of the file inside the gallery directory.
    #[serde(rename = "path")]
    pub filename: String,
    /// Public identifier: `{gallery slug}/{filename}`.
    pub fullpath: String,
    /// Filename without extension, first character upper-cased.
    #[serde(rename = "name")]
    pub display_name: String,
    /// File modification time captured when the image was registered.
    #[serde(rename = "modified")]
    pub modified_at: DateTime<Utc>,
}

impl Image {
    /// Create an image entry owned by the gallery `slug`.
    pub fn new(slug: &str, filename: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        let filename = filename.into();
        Self {
            fullpath: fullpath(slug, &filename),
            display_name: display_name(&filename),
            filename,
            modified_at,
        }
    }
}

/// Build the public identifier of an image.
pub fn fullpath(slug: &str, filename: &str) -> String {
    format!("{slug}/{filename}")
}

/// Derive the display name of an image from its filename.
///
/// The last extension is stripped and the first character upper-cased:
/// `beach.jpg` becomes `Beach`, `archive.tar.gz` becomes `Archive.tar`.
pub fn display_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Slug and display name of a gallery, without its images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GallerySummary {
    #[serde(rename = "path")]
    pub slug: String,
    pub name: String,
}

/// A gallery together with its full image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryDetail {
    pub gallery: GallerySummary,
    pub images: Vec<Image>,
}

/// A named folder of images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    /// Unique identifier, also the directory name under the storage root.
    #[serde(rename = "path")]
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Images in upload order.
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Gallery {
    /// Create an empty gallery whose slug and name are both `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: name.clone(),
            name,
            images: Vec::new(),
        }
    }

    pub fn summary(&self) -> GallerySummary {
        GallerySummary {
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }

    pub fn detail(&self) -> GalleryDetail {
        GalleryDetail {
            gallery: self.summary(),
            images: self.images.clone(),
        }
    }

    /// Whether this gallery is addressed by `name`, either as slug or display name.
    pub fn is_named(&self, name: &str) -> bool {
        self.slug == name || self.name == name
    }

    pub fn has_image(&self, filename: &str) -> bool {
        self.images.iter().any(|i| i.filename == filename)
    }

    /// Give the gallery a new slug and name, re-pointing every image fullpath.
    pub fn rename(&mut self, new_name: &str) {
        self.slug = new_name.to_string();
        self.name = new_name.to_string();
        for image in &mut self.images {
            image.fullpath = fullpath(&self.slug, &image.filename);
        }
    }
}

/// Ordered collection of every gallery; the sole source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    galleries: Vec<Gallery>,
}

impl Index {
    pub fn new(galleries: Vec<Gallery>) -> Self {
        Self { galleries }
    }

    pub fn galleries(&self) -> &[Gallery] {
        &self.galleries
    }

    pub fn galleries_mut(&mut self) -> &mut Vec<Gallery> {
        &mut self.galleries
    }

    pub fn len(&self) -> usize {
        self.galleries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.galleries.is_empty()
    }

    /// Find a gallery by slug.
    pub fn find(&self, slug: &str) -> Option<&Gallery> {
        self.galleries.iter().find(|g| g.slug == slug)
    }

    /// Position of the gallery with the given slug.
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.galleries.iter().position(|g| g.slug == slug)
    }

    /// Whether any gallery other than the one at `skip` is addressed by `name`.
    pub fn name_taken(&self, name: &str, skip: Option<usize>) -> bool {
        self.galleries
            .iter()
            .enumerate()
            .any(|(i, g)| Some(i) != skip && g.is_named(name))
    }

    /// Locate an image by fullpath, returning (gallery position, image position).
    pub fn locate_image(&self, fullpath: &str) -> Option<(usize, usize)> {
        self.galleries.iter().enumerate().find_map(|(gi, g)| {
            g.images
                .iter()
                .position(|i| i.fullpath == fullpath)
                .map(|ii| (gi, ii))
        })
    }

    pub fn push(&mut self, gallery: Gallery) {
        self.galleries.push(gallery);
    }

    pub fn remove(&mut self, position: usize) -> Gallery {
        self.galleries.remove(position)
    }
}
