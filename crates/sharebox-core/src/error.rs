//! Lifecycle error types

use sharebox_auth::AuthError;
use sharebox_records::RecordError;
use sharebox_storage::StorageError;
use thiserror::Error;

use crate::upload::size_limit_message;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("User already exists")]
    UserExists,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("{}", size_limit_message(*.max))]
    PayloadTooLarge { size: u64, max: u64 },

    /// A multi-write operation stopped halfway
    #[error("{operation} left inconsistent state: {completed}, but {failed}")]
    Inconsistent {
        operation: &'static str,
        completed: String,
        failed: String,
    },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Record store error: {0}")]
    Records(RecordError),

    #[error("Blob store error: {0}")]
    Storage(StorageError),
}

impl From<AuthError> for LifecycleError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::FileNotFound(_) => LifecycleError::NotFound("File not found".into()),
            AuthError::UserNotFound(_) => LifecycleError::NotFound("User not found".into()),
            AuthError::Forbidden(msg) => LifecycleError::Forbidden(msg),
            AuthError::Unauthorized(msg) => LifecycleError::Unauthorized(msg),
            AuthError::Credential(msg) => LifecycleError::Credential(msg),
            AuthError::Records(e) => e.into(),
        }
    }
}

impl From<RecordError> for LifecycleError {
    fn from(err: RecordError) -> Self {
        match err {
            // A record vanishing between the check and the write is retryable
            RecordError::NotFound { collection, .. } => {
                LifecycleError::NotFound(format!("Record not found in {collection}"))
            }
            RecordError::AlreadyExists { collection, key } => {
                LifecycleError::Conflict(format!("Record {key} already exists in {collection}"))
            }
            other => LifecycleError::Records(other),
        }
    }
}

impl From<StorageError> for LifecycleError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => LifecycleError::NotFound("File content not found".into()),
            other => LifecycleError::Storage(other),
        }
    }
}
