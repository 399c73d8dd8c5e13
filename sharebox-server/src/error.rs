use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sharebox_core::LifecycleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A multi-write operation stopped halfway
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    /// A store failed underneath an otherwise valid request
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Inconsistent(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ServerError::Unauthorized(msg)
            | ServerError::Forbidden(msg)
            | ServerError::NotFound(msg)
            | ServerError::Conflict(msg)
            | ServerError::BadRequest(msg)
            | ServerError::PayloadTooLarge(msg) => msg,
            ServerError::Inconsistent(msg) => {
                tracing::error!("Inconsistent state: {}", msg);
                msg
            }
            ServerError::Backend(msg) => {
                tracing::error!("Backend error: {}", msg);
                "Storage backend unavailable".into()
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".into()
            }
        };

        let body = Json(json!({ "error": message }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<LifecycleError> for ServerError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(msg) => ServerError::NotFound(msg),
            LifecycleError::Forbidden(msg) => ServerError::Forbidden(msg),
            LifecycleError::Unauthorized(reason) => ServerError::Unauthorized(match reason.as_str() {
                "expired" => "Signature has expired".into(),
                _ => "Invalid token".into(),
            }),
            LifecycleError::BadRequest(msg) => ServerError::BadRequest(msg),
            LifecycleError::Conflict(msg) => ServerError::Conflict(msg),
            err @ LifecycleError::UserExists => ServerError::BadRequest(err.to_string()),
            err @ LifecycleError::InvalidCredentials => ServerError::NotFound(err.to_string()),
            err @ LifecycleError::PayloadTooLarge { .. } => {
                ServerError::PayloadTooLarge(err.to_string())
            }
            err @ LifecycleError::Inconsistent { .. } => ServerError::Inconsistent(err.to_string()),
            LifecycleError::Credential(msg) => ServerError::Internal(msg),
            err @ (LifecycleError::Records(_) | LifecycleError::Storage(_)) => {
                ServerError::Backend(err.to_string())
            }
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
