// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commuter API Server
//!
//! Receives Strava webhook notifications and rewrites the visibility,
//! commute flag and description of new activities.

use commuter::{
    build_chain,
    config::Config,
    db::FirestoreDb,
    services::{
        ActivityProcessor, CredentialCache, CredentialStore, MemoryCredentialStore, StravaClient,
    },
    time_utils::TimezoneCache,
    AppState,
};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Commuter API");

    // Credential persistence: Firestore when a project is configured
    let store: Arc<dyn CredentialStore> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(
            FirestoreDb::new(project_id)
                .await
                .context("Failed to connect to Firestore")?,
        ),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, credentials are kept in memory");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let strava = StravaClient::from_config(&config);
    let credentials = CredentialCache::new(store, Arc::new(strava.clone()));

    // A bad challenge definition is a programming error; refuse to start.
    let timezones = TimezoneCache::new();
    let chain = build_chain(&config, &timezones).context("Invalid rule configuration")?;
    tracing::info!(rules = ?chain.names(), "Rule chain configured");

    let processor = ActivityProcessor::new(strava.clone(), credentials, chain);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        strava,
        processor,
    });

    // Build router
    let app = commuter::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("commuter=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
