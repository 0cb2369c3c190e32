//! Error types for object storage.

use thiserror::Error;

/// Result type for object storage operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Errors that can occur in object storage operations.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The S3 call failed.
    #[error("S3 operation failed: {0}")]
    S3(String),

    /// Invalid storage configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
