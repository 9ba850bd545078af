//! Storage error types

use sponsor_types::PatchRejection;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure of a storage backend to complete an operation.
///
/// `Rejected` is the caller's fault and carries the reason an update was
/// refused; everything else is a backend failure.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate {key} in {table}")]
    Duplicate { table: &'static str, key: String },

    #[error("Corrupt record in {table}: {message}")]
    Corrupt { table: &'static str, message: String },

    /// An update that would leave the record invalid; nothing was written
    #[error(transparent)]
    Rejected(#[from] PatchRejection),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}
