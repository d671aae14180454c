//! Error types for the game API.
//!
//! [`ApiError`] covers the requests the API refuses outright. Game-level
//! problems such as an illegal move are not errors here: they come back
//! as a `200` snapshot carrying an `error` field.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use evoplay_types::UnknownGame;

/// Errors that can occur in the game API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The path names a game that is not hosted.
    #[error("{source}")]
    UnknownGame {
        /// The parse failure carrying the requested name.
        #[from]
        source: UnknownGame,
    },

    /// A required query parameter was absent or empty.
    #[error("Missing '{0}' query parameter.")]
    MissingParameter(&'static str),

    /// A blocking service task failed to complete.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownGame { .. } => StatusCode::NOT_FOUND,
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
