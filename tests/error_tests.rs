// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{http::StatusCode, response::IntoResponse};
use stracal::error::AppError;

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::AuthExchange("x".to_string()), StatusCode::BAD_GATEWAY),
        (AppError::RetryExhausted { retries: 1 }, StatusCode::BAD_GATEWAY),
        (AppError::Storage("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        assert_eq!(err.into_response().status(), expected);
    }
}

#[test]
fn test_retry_exhausted_message() {
    let err = AppError::RetryExhausted { retries: 2 };
    assert_eq!(
        err.to_string(),
        "Retry budget exhausted after 2 token refresh attempts"
    );
}
