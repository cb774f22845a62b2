// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login and callback flow.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use commuter::config::Config;
use commuter::models::Credential;
use commuter::services::{CredentialStore, UpdaterChain};
use common::create_test_app;
use mockito::Matcher;
use serde_json::json;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_login_redirects_to_strava() {
    let server = mockito::Server::new_async().await;
    let (app, _, _) = create_test_app(&server.url(), Config::default(), UpdaterChain::default());

    let response = app.oneshot(get("/strava/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with(&format!(
        "{}/oauth/authorize?client_id=test_client_id&",
        server.url()
    )));
    assert!(location.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fstrava%2Fcallback"));
    assert!(location.contains("scope=activity:read,activity:read_all,activity:write"));
}

#[tokio::test]
async fn test_callback_stores_credential() {
    let mut server = mockito::Server::new_async().await;
    let (app, _, store) = create_test_app(&server.url(), Config::default(), UpdaterChain::default());

    let exchange = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "the-code".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "token_type": "Bearer",
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_at": 2000000000,
                "expires_in": 21600,
                "athlete": {"id": 99, "firstname": "Ada", "lastname": "L"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let response = app
        .oneshot(get("/strava/callback?code=the-code&scope=read,activity:write"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION].to_str().unwrap(),
        "http://localhost:8080"
    );
    exchange.assert_async().await;

    let payload = store.load(99).await.unwrap().unwrap();
    let credential: Credential = serde_json::from_slice(&payload).unwrap();
    assert_eq!(credential.access_token, "access");
    assert_eq!(credential.refresh_token, "refresh");
    assert_eq!(credential.expires_at.timestamp(), 2000000000);
}

#[tokio::test]
async fn test_callback_rejects_denied_authorization() {
    let mut server = mockito::Server::new_async().await;
    let exchange = server
        .mock("POST", "/oauth/token")
        .expect(0)
        .create_async()
        .await;
    let (app, _, _) = create_test_app(&server.url(), Config::default(), UpdaterChain::default());

    let response = app
        .clone()
        .oneshot(get("/strava/callback?error=access_denied"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/strava/callback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    exchange.assert_async().await;
}

#[tokio::test]
async fn test_callback_exchange_failure_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    let _exchange = server
        .mock("POST", "/oauth/token")
        .with_status(400)
        .with_body(r#"{"message":"Bad Request"}"#)
        .create_async()
        .await;
    let (app, _, store) = create_test_app(&server.url(), Config::default(), UpdaterChain::default());

    let response = app
        .oneshot(get("/strava/callback?code=stale"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(store.load(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_callback_rejects_out_of_range_expiry() {
    let mut server = mockito::Server::new_async().await;
    let _exchange = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_at": i64::MAX,
                "athlete": {"id": 99}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let (app, _, store) = create_test_app(&server.url(), Config::default(), UpdaterChain::default());

    let response = app
        .oneshot(get("/strava/callback?code=the-code"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.load(99).await.unwrap().is_none());
}
