//! Blob storage adapters for user images.

mod s3_image_store;

pub use s3_image_store::{S3Config, S3ImageStore};
