//! Simulator error types

use thiserror::Error;

/// Simulator errors
///
/// Inside [`Simulator::simulate`](crate::Simulator::simulate) these are
/// rendered into the result envelope rather than returned.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("bucket already exists: {provider}/{name}")]
    BucketAlreadyExists { provider: String, name: String },

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("bucket not found: {provider}/{name}")]
    BucketNotFound { provider: String, name: String },

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("simulation task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
