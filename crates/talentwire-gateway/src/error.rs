//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use talentwire_channels::ChannelError;
use talentwire_engine::EngineError;
use thiserror::Error;

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication or signature verification failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unknown business unit in a webhook path.
    #[error("Unknown business unit: {0}")]
    UnknownUnit(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request body or parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Engine error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::FORBIDDEN,
            Self::UnknownUnit(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::Engine(EngineError::UnknownContact(_)) => StatusCode::NOT_FOUND,
            Self::Engine(EngineError::Channel(ChannelError::Template(_))) => {
                StatusCode::BAD_REQUEST
            }
            Self::Engine(EngineError::Channel(ChannelError::NoChannels(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Auth("bad sig".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::UnknownUnit("nope".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Engine(EngineError::UnknownContact("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
