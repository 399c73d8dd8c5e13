//! Record store error types

use thiserror::Error;

use crate::collection::Collection;

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record not found: {collection}/{key}")]
    NotFound { collection: Collection, key: String },

    #[error("Record already exists: {collection}/{key}")]
    AlreadyExists { collection: Collection, key: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
