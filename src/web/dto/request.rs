//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::gallery_name;

/// Body of gallery create and rename requests.
#[derive(Debug, Deserialize, Validate)]
pub struct GalleryNameRequest {
    /// Gallery name, also used as its slug.
    #[validate(length(min = 1), custom(function = "gallery_name"))]
    pub name: String,
}
