// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error responses for the admin API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minwon_core::MinwonError;
use serde::Serialize;

/// Error body: `{"error": <kind>, "message": <detail>}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// An admin handler failure. Always rendered as 500.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] MinwonError);

impl ApiError {
    fn kind(&self) -> &'static str {
        match self.0 {
            MinwonError::Storage { .. } => "storage_error",
            MinwonError::Config(_) => "config_error",
            MinwonError::Provider { .. } => "provider_error",
            MinwonError::Delivery { .. } => "delivery_error",
            MinwonError::Timeout { .. } => "timeout",
            MinwonError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "admin request failed");
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
