//! Auth error types

use sharebox_records::RecordError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Authenticated but not permitted
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing, expired, or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Record store error: {0}")]
    Records(#[from] RecordError),
}
