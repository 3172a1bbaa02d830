//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Issuance failed: {0}")]
    Issuance(#[from] mockmyid_core::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::MissingParameter(name) => {
                (StatusCode::BAD_REQUEST, format!("Missing parameter: {}", name))
            }
            ServerError::Issuance(e) => {
                tracing::error!("Issuance failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ServerError::Task(e) => {
                tracing::error!("Background task failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
