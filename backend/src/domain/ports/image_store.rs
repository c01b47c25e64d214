//! Port for the image blob store.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use utoipa::ToSchema;

/// Metadata describing one stored image object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Object key within the store.
    pub key: String,
    /// Content hash reported by the store.
    pub etag: String,
    /// MIME type of the stored bytes.
    pub content_type: String,
    /// Object size in bytes.
    pub size: u64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Public URL the object is served from.
    pub url: String,
}

/// Errors raised by blob store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    /// Store connection could not be established.
    #[error("image store connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Store request failed during execution.
    #[error("image store request failed: {message}")]
    Request {
        /// Adapter-level detail.
        message: String,
    },
}

impl ImageStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a request error with the given message.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}

/// Port for image object storage.
///
/// Keys are opaque to the store; the image service namespaces them under
/// `users/{user_id}/`. Deletes are idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write an object, replacing any previous bytes under the key.
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError>;

    /// List objects whose key starts with the prefix, in key order.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredImage>, ImageStoreError>;

    /// Remove an object. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, ImageStoreError>;
}

/// In-memory implementation backing tests and the no-store fallback.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    objects: Mutex<BTreeMap<String, StoredImage>>,
}

impl InMemoryImageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        use sha2::{Digest, Sha256};

        let etag = hex::encode(Sha256::digest(&bytes));
        let stored = StoredImage {
            key: key.to_owned(),
            etag,
            content_type: content_type.to_owned(),
            size: bytes.len() as u64,
            uploaded_at: Utc::now(),
            url: format!("memory://{key}"),
        };
        self.objects
            .lock()
            .map_err(|_| ImageStoreError::request("image store poisoned"))?
            .insert(key.to_owned(), stored.clone());
        Ok(stored)
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredImage>, ImageStoreError> {
        Ok(self
            .objects
            .lock()
            .map_err(|_| ImageStoreError::request("image store poisoned"))?
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, ImageStoreError> {
        Ok(self
            .objects
            .lock()
            .map_err(|_| ImageStoreError::request("image store poisoned"))?
            .remove(key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_reports_size_and_stable_etag() {
        let store = InMemoryImageStore::new();
        let first = store
            .put("users/u1/a.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .expect("put");
        let second = store
            .put("users/u1/b.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .expect("put");

        assert_eq!(first.size, 3);
        assert_eq!(first.etag, second.etag);
        assert_eq!(first.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn list_prefix_scopes_to_one_namespace() {
        let store = InMemoryImageStore::new();
        store
            .put("users/u1/a.jpg", Bytes::from_static(b"a"), "image/jpeg")
            .await
            .expect("put");
        store
            .put("users/u1/b.jpg", Bytes::from_static(b"b"), "image/png")
            .await
            .expect("put");
        store
            .put("users/u2/c.jpg", Bytes::from_static(b"c"), "image/jpeg")
            .await
            .expect("put");

        let listed = store.list_prefix("users/u1/").await.expect("list");
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|object| object.key.starts_with("users/u1/")));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryImageStore::new();
        store
            .put("users/u1/a.jpg", Bytes::from_static(b"a"), "image/jpeg")
            .await
            .expect("put");

        assert!(store.delete("users/u1/a.jpg").await.expect("delete"));
        assert!(!store.delete("users/u1/a.jpg").await.expect("second delete"));
    }
}
