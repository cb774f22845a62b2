// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for Strava events.

use crate::error::{AppError, Result};
use crate::models::WebhookEvent;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Webhook routes. Strava uses GET for the handshake and POST for events.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/strava/webhook", get(verify_subscription).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct HubParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
}

/// Verification response.
#[derive(Serialize)]
struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

async fn handle_event(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response> {
    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;

    tracing::info!(
        object_type = ?event.object_type,
        aspect_type = ?event.aspect_type,
        object_id = event.object_id,
        owner_id = event.owner_id,
        subscription_id = event.subscription_id,
        "Webhook event received"
    );

    if !event.is_actionable() {
        tracing::debug!(object_id = event.object_id, "Ignoring event");
        return Ok(StatusCode::OK.into_response());
    }

    let result = state
        .processor
        .process_activity(event.owner_id, event.object_id)
        .await?;

    tracing::info!(
        activity_id = result.activity_id,
        updated = result.updated,
        "Webhook event processed"
    );

    Ok(StatusCode::OK.into_response())
}

/// Answer the subscription handshake by echoing the challenge.
async fn verify_subscription(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HubParams>,
) -> Result<Json<VerifyResponse>> {
    if params.mode.as_deref() != Some("subscribe") {
        return Err(AppError::BadRequest("expected hub.mode=subscribe".to_string()));
    }

    if let Some(expected) = &state.config.webhook_verify_token {
        if params.verify_token.as_deref() != Some(expected.as_str()) {
            tracing::warn!("Webhook verification failed: invalid token");
            return Err(AppError::Forbidden("invalid verify token".to_string()));
        }
    }

    tracing::info!("Webhook subscription verified");
    Ok(Json(VerifyResponse {
        challenge: params.challenge.unwrap_or_default(),
    }))
}
