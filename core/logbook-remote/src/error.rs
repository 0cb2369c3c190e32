//! Error types for the remote data service.

use crate::mutation::MutationFailure;
use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote data service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// Request-level GraphQL errors (no data returned).
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// A single mutation was rejected by the service.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    /// A conditional update lost against a newer version of the record.
    #[error("{operation} conflicts with a newer version: {message}")]
    Conflict {
        operation: &'static str,
        message: String,
    },

    /// The addressed record does not exist.
    #[error("{operation} target not found: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    /// The response carried no data for an operation.
    #[error("response is missing data for {0}")]
    MissingData(String),

    /// The response carried data of the wrong shape for an operation.
    #[error("unexpected output for {0}")]
    UnexpectedOutput(&'static str),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RemoteError {
    /// Returns true if the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }

    /// Returns true if a conditional update was rejected.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::Conflict { .. })
    }
}

impl From<MutationFailure> for RemoteError {
    fn from(failure: MutationFailure) -> Self {
        let operation = failure.kind.operation_name();
        if failure.is_conflict() {
            RemoteError::Conflict {
                operation,
                message: failure.message,
            }
        } else if failure.is_not_found() {
            RemoteError::NotFound {
                operation,
                message: failure.message,
            }
        } else {
            RemoteError::Rejected {
                operation,
                message: failure.message,
            }
        }
    }
}
