//! API error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use market::RefreshError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The synchronous refresh behind a cold-start request failed.
    #[error("Error fetching stock data.")]
    ColdStart(#[from] RefreshError),
}

/// `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::ColdStart(cause) => {
                tracing::error!(error = %cause, "cold-start refresh failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
