//! S3-backed `ImageStore` implementation.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ImageStore, ImageStoreError, StoredImage};

/// Configuration for the S3 image store.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket the images live in.
    pub bucket: String,
    /// Base URL objects are publicly served from, without a trailing slash.
    pub public_base_url: String,
}

/// S3-backed implementation of the `ImageStore` port.
///
/// Credentials and region come from the ambient AWS environment. Objects are
/// assumed publicly readable under `public_base_url`.
#[derive(Clone)]
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ImageStore {
    /// Build a store from the ambient AWS environment.
    pub async fn from_env(config: S3Config) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Build a store around an existing client.
    pub fn with_client(client: Client, config: S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    async fn head(&self, key: &str) -> Result<Option<StoredImage>, ImageStoreError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;
        match result {
            Ok(output) => Ok(Some(StoredImage {
                key: key.to_owned(),
                etag: normalise_etag(output.e_tag()),
                content_type: output
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned(),
                size: output.content_length().unwrap_or_default().max(0) as u64,
                uploaded_at: smithy_to_chrono(output.last_modified()),
                url: self.url_for(key),
            })),
            Err(error) => {
                if error
                    .as_service_error()
                    .is_some_and(|service| service.is_not_found())
                {
                    Ok(None)
                } else {
                    Err(ImageStoreError::request(error.to_string()))
                }
            }
        }
    }
}

/// S3 quotes etags; strip the quotes so callers get the bare hash.
fn normalise_etag(etag: Option<&str>) -> String {
    etag.unwrap_or_default().trim_matches('"').to_owned()
}

fn smithy_to_chrono(value: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    value
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let size = bytes.len() as u64;
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|error| ImageStoreError::request(error.to_string()))?;

        Ok(StoredImage {
            key: key.to_owned(),
            etag: normalise_etag(output.e_tag()),
            content_type: content_type.to_owned(),
            size,
            uploaded_at: Utc::now(),
            url: self.url_for(key),
        })
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredImage>, ImageStoreError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|error| ImageStoreError::request(error.to_string()))?;

            for object in output.contents() {
                let Some(key) = object.key() else { continue };
                // Listing omits the content type; fetch it per object.
                if let Some(stored) = self.head(key).await? {
                    objects.push(stored);
                }
            }

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_owned()),
                None => break,
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<bool, ImageStoreError> {
        // S3 deletes are silent about missing keys; probe first so callers
        // can distinguish.
        if self.head(key).await?.is_none() {
            return Ok(false);
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| ImageStoreError::request(error.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("\"abc123\""), "abc123")]
    #[case(Some("abc123"), "abc123")]
    #[case(None, "")]
    fn etags_lose_their_quotes(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(normalise_etag(raw), expected);
    }

    #[rstest]
    fn missing_timestamps_fall_back_to_now() {
        let before = Utc::now();
        let converted = smithy_to_chrono(None);
        assert!(converted >= before);
    }
}
