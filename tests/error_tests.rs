// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pr_tracker::error::{AppError, StoreError, ValidationError};

async fn status_and_code(err: AppError) -> (StatusCode, String) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json["error"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_error_taxonomy_status_codes() {
    let cases = [
        (
            AppError::Validation(ValidationError::MissingDistance),
            StatusCode::BAD_REQUEST,
            "validation_error",
        ),
        (AppError::AuthRequired, StatusCode::UNAUTHORIZED, "unauthorized"),
        (
            AppError::Fetch(StoreError::Offline),
            StatusCode::BAD_GATEWAY,
            "fetch_error",
        ),
        (
            AppError::Write(StoreError::NoMatch),
            StatusCode::BAD_GATEWAY,
            "write_error",
        ),
        (
            AppError::Upload(StoreError::Request("timeout".to_string())),
            StatusCode::BAD_GATEWAY,
            "upload_error",
        ),
        (
            AppError::NotFound("Record".to_string()),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
    ];

    for (err, status, code) in cases {
        assert_eq!(status_and_code(err).await, (status, code.to_string()));
    }
}

#[tokio::test]
async fn test_backend_rejecting_token_is_reported_as_invalid_token() {
    let err = AppError::Fetch(StoreError::Status {
        status: 401,
        body: "JWT expired".to_string(),
    });
    assert_eq!(
        status_and_code(err).await,
        (StatusCode::UNAUTHORIZED, "invalid_token".to_string())
    );
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    assert!(!String::from_utf8_lossy(&body).contains("secret detail"));
}
