// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use commuter::error::AppError;
use commuter::services::CredentialError;

#[test]
fn test_is_strava_token_error_matches() {
    let err = AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string());
    assert!(err.is_strava_token_error());

    let err = AppError::from(CredentialError::Refresh("invalid_grant".to_string()));
    assert!(err.is_strava_token_error());
}

#[test]
fn test_is_strava_token_error_no_match() {
    let err = AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::StravaApi("HTTP 500 Internal Server Error: oops".to_string());
    assert!(!err.is_strava_token_error());

    // A rejected request body is not a token problem.
    let err = AppError::StravaApi(
        r#"HTTP 400 Bad Request: {"message":"Bad Request","errors":[{"code":"invalid"}]}"#
            .to_string(),
    );
    assert!(!err.is_strava_token_error());

    let err = AppError::BadRequest("invalid token".to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::from(CredentialError::NotFound(1));
    assert!(!err.is_strava_token_error());
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
        (
            AppError::InvalidPayload("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (AppError::StravaApi("x".into()), StatusCode::BAD_GATEWAY),
        (
            AppError::from(CredentialError::NotFound(1)),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Database("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), status, "{}", label);
    }
}
