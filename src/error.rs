// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Profile not available: {0}")]
    ProfileUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::ProfileUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "profile_unavailable",
                Some(msg.clone()),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Failures signaled by profile resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Resolution was requested without a session. Never produced by the
    /// normal event flow.
    #[error("no authenticated session")]
    NotAuthenticated,

    #[error("profile read failed: {0}")]
    ReadFailed(String),

    /// Provisioning write failed. Swallowed by the resolver; kept so callers
    /// can log it.
    #[error("profile write failed: {0}")]
    WriteFailed(String),

    #[error("profile read timed out")]
    Timeout,

    #[error("unexpected resolution failure: {0}")]
    Unexpected(String),
}

impl ResolveError {
    /// Whether a retry with the same session can succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ResolveError::NotAuthenticated)
    }

    /// Short reason shown in the profile error view.
    pub fn reason(&self) -> String {
        match self {
            ResolveError::Timeout => "timeout".to_string(),
            other => other.to_string(),
        }
    }
}
