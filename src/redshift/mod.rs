//! Redshift convenience layer
//!
//! Wraps the Redshift Data API so warehouse access needs no driver
//! connection: statements go in as SQL strings, results come back as
//! [`DataFrame`](crate::frame::DataFrame)s.
//!
//! - [`client::RedshiftClient`] - statement execution and result retrieval
//! - [`statement`] - query targets, statement handles and COPY/UNLOAD SQL

pub mod client;
pub mod statement;

// Re-export commonly used types
pub use client::RedshiftClient;
pub use statement::{DataFormat, QueryTarget, StatementId};
