// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/strava/login", get(login))
        .route("/strava/callback", get(callback))
}

/// Callback URL registered with Strava.
fn callback_url(state: &AppState) -> String {
    format!("{}/strava/callback", state.config.base_url)
}

/// Start OAuth flow - redirect to Strava authorization.
async fn login(State(state): State<Arc<AppState>>) -> Redirect {
    let auth_url = state.strava.authorize_url(&callback_url(&state));

    tracing::info!(
        client_id = %state.config.strava_client_id,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&auth_url)
}

#[derive(Deserialize)]
struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code and store the athlete's credential.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!("authorization failed: {}", error)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("missing code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let exchange = state.strava.exchange_code(&code).await?;
    let athlete_id = exchange.athlete.id;

    state
        .processor
        .credentials()
        .store_credential(athlete_id, &exchange.token.into_credential()?)
        .await?;

    tracing::info!(athlete_id, "OAuth successful, credential stored");

    Ok(Redirect::temporary(&state.config.base_url))
}
