//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::gallery::{validate_segment, MAX_GALLERY_NAME_LENGTH};
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. Malformed or invalid bodies are rejected with
/// a 400 response.
///
/// # Example
///
/// ```ignore
/// use galleryd::web::dto::ValidatedJson;
///
/// async fn create_gallery(
///     ValidatedJson(payload): ValidatedJson<GalleryNameRequest>,
/// ) -> Result<Json<GallerySummary>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string can be used as a gallery name.
///
/// The name doubles as a directory name, so it must be a single path segment.
pub fn gallery_name(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_GALLERY_NAME_LENGTH {
        return Err(ValidationError::new("gallery_name").with_message(
            format!("Must be at most {MAX_GALLERY_NAME_LENGTH} characters").into(),
        ));
    }

    validate_segment("gallery name", value).map_err(|e| {
        ValidationError::new("gallery_name").with_message(e.to_string().into())
    })?;

    Ok(())
}
