// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::models::LatLng;
use std::env;

/// Default per-axis geofence margin in degrees (roughly 500m).
pub const DEFAULT_GEOFENCE_MARGIN: f64 = 0.005;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Public URL of this service (OAuth callback, post-login redirect)
    pub base_url: String,
    /// Server port
    pub port: u16,
    /// Strava REST API base URL
    pub strava_api_url: String,
    /// Strava OAuth base URL
    pub strava_oauth_url: String,
    /// GCP project ID. Credentials are kept in memory when unset.
    pub gcp_project_id: Option<String>,
    /// Optional token Strava must echo during the subscription handshake
    pub webhook_verify_token: Option<String>,
    /// Home/work geofence, if configured
    pub geofence: Option<GeofenceConfig>,
    /// Geofence rules to install, in chain order
    pub geofence_rules: Vec<GeofenceRuleKind>,
}

/// Reference points for commute classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceConfig {
    pub home: LatLng,
    pub work: LatLng,
    /// Per-axis margin in degrees
    pub margin: f64,
}

/// Which flag a geofence rule writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceRuleKind {
    /// Write the classification into `hide_from_home`
    Hide,
    /// Write the classification into `commute`
    Commute,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            base_url: "http://localhost:8080".to_string(),
            port: 8080,
            strava_api_url: "https://www.strava.com/api/v3".to_string(),
            strava_oauth_url: "https://www.strava.com/oauth".to_string(),
            gcp_project_id: None,
            webhook_verify_token: None,
            geofence: None,
            geofence_rules: vec![GeofenceRuleKind::Hide, GeofenceRuleKind::Commute],
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            base_url: env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            strava_api_url: env::var("STRAVA_API_URL").unwrap_or(defaults.strava_api_url),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL").unwrap_or(defaults.strava_oauth_url),
            gcp_project_id: optional_var("GCP_PROJECT_ID"),
            webhook_verify_token: optional_var("WEBHOOK_VERIFY_TOKEN"),
            geofence: geofence_from_env()?,
            geofence_rules: match optional_var("COMMUTE_RULES") {
                Some(list) => parse_geofence_rules(&list)?,
                None => defaults.geofence_rules,
            },
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn geofence_from_env() -> Result<Option<GeofenceConfig>, ConfigError> {
    let home = optional_var("COMMUTE_HOME");
    let work = optional_var("COMMUTE_WORK");

    let (home, work) = match (home, work) {
        (None, None) => return Ok(None),
        (Some(home), Some(work)) => (home, work),
        (Some(_), None) => return Err(ConfigError::Missing("COMMUTE_WORK")),
        (None, Some(_)) => return Err(ConfigError::Missing("COMMUTE_HOME")),
    };

    let margin = match optional_var("COMMUTE_MARGIN") {
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite() && *m >= 0.0)
            .ok_or_else(|| ConfigError::Invalid("COMMUTE_MARGIN", v))?,
        None => DEFAULT_GEOFENCE_MARGIN,
    };

    Ok(Some(GeofenceConfig {
        home: parse_lat_lng(&home).ok_or(ConfigError::Invalid("COMMUTE_HOME", home.clone()))?,
        work: parse_lat_lng(&work).ok_or(ConfigError::Invalid("COMMUTE_WORK", work.clone()))?,
        margin,
    }))
}

/// Parse a `lat,lng` pair.
pub fn parse_lat_lng(value: &str) -> Option<LatLng> {
    let (lat, lng) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(LatLng::new(lat, lng))
}

/// Parse a comma separated list such as `hide,commute`.
pub fn parse_geofence_rules(list: &str) -> Result<Vec<GeofenceRuleKind>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_ascii_lowercase().as_str() {
            "hide" => Ok(GeofenceRuleKind::Hide),
            "commute" => Ok(GeofenceRuleKind::Commute),
            _ => Err(ConfigError::Invalid("COMMUTE_RULES", s.to_string())),
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("Invalid date: {0}")]
    Date(String),
}
