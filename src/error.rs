use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Resume analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Failed to deliver interview invitation: {0}")]
    InvitationFailed(String),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Failed to schedule interview: {0}")]
    SchedulingFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        // Invalid and expired tokens are different user-facing outcomes and
        // must not be merged into one status.
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::TokenInvalid(msg) => (StatusCode::BAD_REQUEST, format!("Invalid token: {}", msg)),
            Error::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired".to_string()),
            Error::AnalysisFailed(msg) => (StatusCode::BAD_GATEWAY, format!("Resume analysis failed: {}", msg)),
            Error::InvitationFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Failed to deliver interview invitation: {}", msg),
            ),
            Error::SchedulingFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to schedule interview: {}. Please retry the confirmation link.", msg),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Reqwest(err) => (StatusCode::BAD_GATEWAY, format!("External service error: {}", err)),
            other => {
                let correlation_id = uuid::Uuid::new_v4();
                tracing::error!(%correlation_id, error = %other, "unexpected internal error");
                let body = Json(json!({
                    "error": "An unexpected error occurred",
                    "correlation_id": correlation_id,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
