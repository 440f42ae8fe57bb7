//! Errors reported by the item repository

use thiserror::Error;

use crate::persistence::{StorageError, StoreError};

/// Failure of a repository operation
///
/// `StorageUnavailable` and `Serialize` are both reported after the in-memory
/// mutation was applied: memory is ahead of storage until a later save
/// succeeds.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Required field missing or blank; nothing changed and nothing was saved
    #[error("missing or invalid field: {field}")]
    Validation { field: &'static str },
    #[error("no item with id '{0}'")]
    NotFound(String),
    /// The backend rejected the write (full, disabled, I/O error)
    #[error("change kept in memory but not saved: {0}")]
    StorageUnavailable(StorageError),
    /// The collection could not be encoded; the backend was never called
    #[error("change kept in memory but could not be encoded: {0}")]
    Serialize(serde_json::Error),
    #[error("could not generate a free id after {attempts} attempts")]
    IdExhausted { attempts: u32 },
}

impl From<StoreError> for RepositoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Storage(e) => RepositoryError::StorageUnavailable(e),
            StoreError::Serialize(e) => RepositoryError::Serialize(e),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
