// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commuter: rewrite Strava activities as they are uploaded
//!
//! This crate receives Strava webhook notifications, runs each new or
//! updated activity through an ordered chain of rules (commute geofence,
//! challenge progress) and writes the activity back when a rule changed it.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{Config, ConfigError};
use services::{challenges, geofence, ActivityProcessor, StravaClient, UpdaterChain};
use std::sync::Arc;
use time_utils::TimezoneCache;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub processor: ActivityProcessor,
}

/// Build the rule chain: configured geofence rules, then the built-in challenges.
pub fn build_chain(
    config: &Config,
    timezones: &TimezoneCache,
) -> Result<UpdaterChain, ConfigError> {
    let mut chain = UpdaterChain::default();

    match &config.geofence {
        Some(fence) => {
            for rule in geofence::rules(fence, &config.geofence_rules) {
                chain.push(rule);
            }
        }
        None => tracing::warn!("COMMUTE_HOME/COMMUTE_WORK not set, geofence rules disabled"),
    }

    for challenge in challenges::builtin(timezones)? {
        chain.push(Arc::new(challenge));
    }

    Ok(chain)
}
