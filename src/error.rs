use thiserror::Error;

use crate::idgen::IdError;

pub(crate) type Result<T> = std::result::Result<T, StoreError>;

/// The four ways a store operation can fail, as seen by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    InvalidInput,
    NotFound,
    AlreadyExists,
    StorageFailure,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Storage(#[from] bucketdb::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error("background task failed: {0}")]
    Background(String),
}

impl StoreError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StoreError::Storage(_)
            | StoreError::Encoding(_)
            | StoreError::Id(_)
            | StoreError::Background(_) => ErrorKind::StorageFailure,
        }
    }
}
