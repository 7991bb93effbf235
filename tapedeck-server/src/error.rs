//! Error types for the tapedeck server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No endpoints were configured.
    #[error("No endpoints configured. Call .with_stream() before .build()")]
    NoEndpoints,
}

/// Errors returned to HTTP clients before a stream starts.
///
/// Once the stream has started, failures travel inside it as `RUN_ERROR`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The body was not a valid chat request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::InvalidRequest(e) => (StatusCode::BAD_REQUEST, e),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
