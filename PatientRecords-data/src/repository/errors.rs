use std::sync::PoisonError;
use thiserror::Error;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// File system error while reading or writing the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store contents could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Store configuration error
    #[error("Store configuration error: {0}")]
    Config(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
