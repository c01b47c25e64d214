//! User image uploads: validation, downscaling, and blob storage.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use image::imageops::FilterType;
use image::{ImageFormat, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::ports::{ImageStore, ImageStoreError, StoredImage};
use crate::domain::user::UserId;

/// Upload size cap in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Longest edge after downscaling, in pixels.
pub const MAX_DIMENSION: u32 = 1600;

/// One image owned by a user, as returned by the images endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserImage {
    /// Identifier of the image within the owner's namespace.
    pub image_id: Uuid,
    /// Full object key in the blob store.
    pub image_key: String,
    /// Content hash reported by the store.
    pub etag: String,
    /// MIME type of the stored bytes.
    pub content_type: String,
    /// Object size in bytes.
    pub size: u64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Public URL the image is served from.
    pub url: String,
}

impl UserImage {
    fn from_stored(stored: StoredImage) -> Option<Self> {
        let image_id = stored.key.rsplit('/').next()?.parse().ok()?;
        Some(Self {
            image_id,
            image_key: stored.key,
            etag: stored.etag,
            content_type: stored.content_type,
            size: stored.size,
            uploaded_at: stored.uploaded_at,
            url: stored.url,
        })
    }
}

fn map_store_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Connection { .. } => {
            Error::service_unavailable("image storage is unavailable")
        }
        ImageStoreError::Request { message } => Error::internal(message),
    }
}

fn format_for(content_type: &str) -> Option<ImageFormat> {
    match content_type {
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        _ => None,
    }
}

fn object_key(user_id: &UserId, image_id: &Uuid) -> String {
    format!("users/{user_id}/{image_id}")
}

/// Downscale jpeg or png payloads whose longest edge exceeds the cap.
///
/// Payloads already within bounds are stored byte-for-byte. Webp and gif
/// uploads are never re-encoded (gif to preserve animation frames).
fn process(bytes: Bytes, content_type: &str) -> Result<Bytes, Error> {
    let Some(format) = format_for(content_type) else {
        return Ok(bytes);
    };
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|_| Error::invalid_request("image data could not be decoded"))?;
    if decoded.width().max(decoded.height()) <= MAX_DIMENSION {
        return Ok(bytes);
    }

    let resized = decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);
    let output = match format {
        ImageFormat::Jpeg => ImageOutputFormat::Jpeg(85),
        _ => ImageOutputFormat::Png,
    };
    let mut encoded = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut encoded), output)
        .map_err(|error| Error::internal(format!("image re-encoding failed: {error}")))?;
    Ok(Bytes::from(encoded))
}

/// Orchestrates user image uploads against the blob store.
pub struct ImageService {
    store: Arc<dyn ImageStore>,
}

impl ImageService {
    /// Build a service over the given store.
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Validate, downscale, and store an upload under the owner's namespace.
    pub async fn upload(
        &self,
        user_id: &UserId,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<UserImage, Error> {
        if !matches!(
            content_type,
            "image/jpeg" | "image/png" | "image/webp" | "image/gif"
        ) {
            return Err(Error::invalid_request(format!(
                "unsupported image type {content_type}"
            )));
        }
        if bytes.is_empty() {
            return Err(Error::invalid_request("image payload is empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::invalid_request(format!(
                "image exceeds the {MAX_UPLOAD_BYTES} byte limit"
            )));
        }

        let owned_type = content_type.to_owned();
        let processed = tokio::task::spawn_blocking(move || process(bytes, &owned_type))
            .await
            .map_err(|error| Error::internal(format!("image processing aborted: {error}")))??;

        let image_id = Uuid::new_v4();
        let stored = self
            .store
            .put(&object_key(user_id, &image_id), processed, content_type)
            .await
            .map_err(map_store_error)?;
        UserImage::from_stored(stored)
            .ok_or_else(|| Error::internal("stored image key was not addressable"))
    }

    /// List a user's images in key order.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<UserImage>, Error> {
        let objects = self
            .store
            .list_prefix(&format!("users/{user_id}/"))
            .await
            .map_err(map_store_error)?;
        Ok(objects
            .into_iter()
            .filter_map(UserImage::from_stored)
            .collect())
    }

    /// Remove one image from the owner's namespace.
    pub async fn delete(&self, user_id: &UserId, image_id: &Uuid) -> Result<(), Error> {
        let deleted = self
            .store
            .delete(&object_key(user_id, image_id))
            .await
            .map_err(map_store_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(format!("image {image_id} not found")))
        }
    }
}
