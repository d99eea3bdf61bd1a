//! Convenience wrappers around AWS S3 and Redshift.
//!
//! This crate provides thin, ergonomic clients over the AWS SDK for the two
//! services data pipelines touch most: object storage and the warehouse.
//! Every operation is a direct pass-through to the managed SDK; the value
//! added is a small, consistent surface plus [`frame::DataFrame`] marshaling
//! for moving tabular data in and out of both services.

pub mod config;
pub mod credentials;
pub mod error;
pub mod frame;
pub mod redshift;
pub mod s3;

// Re-export the entry points
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use frame::DataFrame;
pub use redshift::RedshiftClient;
pub use s3::S3Client;
