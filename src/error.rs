// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Bad user input. Raised locally, before any call to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a distance")]
    MissingDistance,

    #[error("Invalid {field} value: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Distance cannot be changed once a record exists")]
    DistanceLocked,

    #[error("Another record is already being edited")]
    EditInProgress,

    #[error("No record is being edited")]
    NotEditing,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Please fill in all fields")]
    MissingCredentials,

    #[error("Bio must be at most {max} characters")]
    BioTooLong { max: usize },

    #[error("Avatar must be an image")]
    NotAnImage,

    #[error("Avatar exceeds the {max} byte limit")]
    AvatarTooLarge { max: usize },

    #[error("Avatar data is not valid base64")]
    InvalidAvatarData,
}

/// Failure talking to the hosted backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Backend not connected (offline mode)")]
    Offline,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("No matching row")]
    NoMatch,
}

impl StoreError {
    /// The backend rejected the caller's access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Request(err.to_string())
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Error fetching data: {0}")]
    Fetch(#[source] StoreError),

    #[error("Error saving data: {0}")]
    Write(#[source] StoreError),

    #[error("Avatar upload failed: {0}")]
    Upload(#[source] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn store_error(&self) -> Option<&StoreError> {
        match self {
            AppError::Fetch(e) | AppError::Write(e) | AppError::Upload(e) => Some(e),
            _ => None,
        }
    }
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
        // An expired session surfaces from the backend as 401; report it as ours.
        if self.store_error().is_some_and(StoreError::is_unauthorized) {
            return AppError::InvalidToken.into_response();
        }

        let (status, error, details) = match &self {
            AppError::AuthRequired => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::AuthFailed(msg) => {
                (StatusCode::UNAUTHORIZED, "auth_failed", Some(msg.clone()))
            }
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(err.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Fetch(err) => {
                tracing::error!(error = %err, "Backend fetch failed");
                (StatusCode::BAD_GATEWAY, "fetch_error", Some(self.to_string()))
            }
            AppError::Write(err) => {
                tracing::error!(error = %err, "Backend write failed");
                (StatusCode::BAD_GATEWAY, "write_error", Some(self.to_string()))
            }
            AppError::Upload(err) => {
                tracing::error!(error = %err, "Backend upload failed");
                (StatusCode::BAD_GATEWAY, "upload_error", Some(self.to_string()))
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
