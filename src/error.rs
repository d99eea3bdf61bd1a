//! Crate-wide error type
//!
//! SDK failures surface through the per-service meta errors; there is no
//! retry or classification layer on top.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("S3 request failed: {0}")]
    S3(#[from] aws_sdk_s3::Error),

    #[error("STS request failed: {0}")]
    Sts(#[from] aws_sdk_sts::Error),

    #[error("Redshift Data API request failed: {0}")]
    Redshift(#[from] aws_sdk_redshiftdata::Error),

    #[error("failed to read object body: {0}")]
    Body(#[from] aws_smithy_types::byte_stream::error::Error),

    #[error("invalid request parameter: {0}")]
    Build(#[from] aws_smithy_types::error::operation::BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet processing error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("AWS credentials are not set in the environment")]
    MissingCredentials,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unexpected service response: {0}")]
    Response(String),

    #[error("statement {id} failed: {message}")]
    Statement { id: String, message: String },

    #[error("not a recognized S3 URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
