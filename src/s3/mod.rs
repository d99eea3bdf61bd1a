//! S3 convenience layer
//!
//! - [`client::S3Client`] - high-level wrapper over the SDK client
//! - [`types`] - bucket, object, metadata and URL types

pub mod client;
pub mod types;

// Re-export commonly used types
pub use client::S3Client;
pub use types::{Bucket, ListObjectsResult, ObjectMetadata, S3Object, S3Url, UploadStatus};
