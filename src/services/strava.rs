// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching, listing and updating activities.
//!
//! Handles:
//! - Activity fetch, paginated listing and update
//! - OAuth code exchange and token refresh
//! - Rate limit and token error detection

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityFilter, Credential, LatLng, SportType};
use crate::services::credentials::{CredentialError, TokenRefresher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest page size the list endpoint accepts.
const LIST_PAGE_SIZE: u32 = 200;

/// Upper bound on pages fetched for a single listing.
const MAX_LIST_PAGES: u32 = 50;

/// OAuth scopes requested at login.
pub const OAUTH_SCOPES: &str = "activity:read,activity:read_all,activity:write";

/// Typed access to the activity endpoints on behalf of one athlete.
#[async_trait]
pub trait ActivityClient: Send + Sync {
    /// Fetch a single activity.
    async fn get_activity(&self, activity_id: u64) -> Result<Activity>;

    /// List every activity matching `filter`.
    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>>;

    /// Write the rule-writable fields of `activity` back to Strava.
    async fn update_activity(&self, activity: &Activity) -> Result<()>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: "https://www.strava.com/api/v3".to_string(),
            oauth_url: "https://www.strava.com/oauth".to_string(),
            client_id,
            client_secret,
        }
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        )
        .with_urls(&config.strava_api_url, &config.strava_oauth_url)
    }

    /// Point the client at different API and OAuth hosts.
    pub fn with_urls(mut self, api_url: &str, oauth_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.oauth_url = oauth_url.trim_end_matches('/').to_string();
        self
    }

    /// Bind an access token, yielding an [`ActivityClient`].
    pub fn authorized(&self, access_token: &str) -> AuthorizedClient {
        AuthorizedClient {
            client: self.clone(),
            access_token: access_token.to_string(),
        }
    }

    /// URL the athlete is sent to for granting access.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             approval_prompt=auto&\
             scope={}&\
             state=state",
            self.oauth_url,
            self.client_id,
            urlencoding::encode(redirect_uri),
            OAUTH_SCOPES
        )
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);
        self.get_json(&url, access_token).await
    }

    /// List one page of the athlete's activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: Option<i64>,  // Unix timestamp
        before: Option<i64>, // Unix timestamp
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>> {
        let url = format!("{}/athlete/activities", self.api_url);

        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Update an activity's writable fields.
    pub async fn update_activity(
        &self,
        access_token: &str,
        activity_id: u64,
        update: &UpdatableActivity,
    ) -> Result<()> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Exchange an authorization code for tokens and the athlete's identity.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Map a non-success response to an error.
async fn error_from_response(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // Rate limit - Strava redelivers the webhook later
    if status.as_u16() == 429 {
        tracing::warn!("Strava rate limit hit (429)");
        return AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string());
    }

    // Unauthorized - token may be expired or revoked
    if status.as_u16() == 401 {
        return AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string());
    }

    AppError::StravaApi(format!("HTTP {}: {}", status, body))
}

#[async_trait]
impl TokenRefresher for StravaClient {
    async fn refresh(
        &self,
        credential: &Credential,
    ) -> std::result::Result<Credential, CredentialError> {
        self.refresh_token(&credential.refresh_token)
            .await
            .map_err(|e| CredentialError::Refresh(e.to_string()))?
            .into_credential()
    }
}

/// [`StravaClient`] bound to one athlete's access token.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: StravaClient,
    access_token: String,
}

#[async_trait]
impl ActivityClient for AuthorizedClient {
    async fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        let activity = self
            .client
            .get_activity(&self.access_token, activity_id)
            .await?;
        Ok(activity.into())
    }

    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        // Strava treats both bounds as exclusive; widen by a second and let
        // the filter decide.
        let after = filter.after.map(|t| t.timestamp() - 1);
        let before = filter.before.map(|t| t.timestamp() + 1);

        let mut activities = Vec::new();
        for page in 1..=MAX_LIST_PAGES {
            let batch = self
                .client
                .list_activities(&self.access_token, after, before, page, LIST_PAGE_SIZE)
                .await?;
            let fetched = batch.len();

            activities.extend(
                batch
                    .into_iter()
                    .map(Activity::from)
                    .filter(|a| filter.matches(a)),
            );

            if fetched < LIST_PAGE_SIZE as usize {
                return Ok(activities);
            }
        }

        tracing::warn!(
            pages = MAX_LIST_PAGES,
            count = activities.len(),
            "Activity listing truncated"
        );
        Ok(activities)
    }

    async fn update_activity(&self, activity: &Activity) -> Result<()> {
        self.client
            .update_activity(
                &self.access_token,
                activity.id,
                &UpdatableActivity::from(activity),
            )
            .await
    }
}

/// Token response from Strava's OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl TokenResponse {
    /// Convert to a stored credential, rejecting an out-of-range expiry.
    pub fn into_credential(self) -> std::result::Result<Credential, CredentialError> {
        let expires_at = DateTime::from_timestamp(self.expires_at, 0).ok_or_else(|| {
            CredentialError::Refresh(format!("invalid expires_at: {}", self.expires_at))
        })?;
        Ok(Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

/// Token exchange response (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

/// Activity as returned by the detail and list endpoints.
///
/// List results carry no description.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub commute: Option<bool>,
    #[serde(default)]
    pub hide_from_home: Option<bool>,
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Seconds
    #[serde(default)]
    pub elapsed_time: u64,
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub end_latlng: Option<Vec<f64>>,
}

impl From<StravaActivity> for Activity {
    fn from(a: StravaActivity) -> Self {
        Activity {
            name: a.name,
            description: a.description.unwrap_or_default(),
            sport_type: a.sport_type.map(SportType::from).unwrap_or_default(),
            commute: a.commute.unwrap_or(false),
            hidden: a.hide_from_home.unwrap_or(false),
            id: a.id,
            start_date: a.start_date,
            distance_km: a.distance / 1000.0,
            moving_time: Duration::from_secs(a.moving_time),
            elapsed_time: Duration::from_secs(a.elapsed_time),
            start_latlng: LatLng::from_strava(a.start_latlng.as_deref()),
            end_latlng: LatLng::from_strava(a.end_latlng.as_deref()),
        }
    }
}

/// Body of `PUT /activities/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatableActivity {
    pub commute: bool,
    pub hide_from_home: bool,
    pub description: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<String>,
}

impl From<&Activity> for UpdatableActivity {
    fn from(a: &Activity) -> Self {
        Self {
            commute: a.commute,
            hide_from_home: a.hidden,
            description: a.description.clone(),
            name: a.name.clone(),
            sport_type: match &a.sport_type {
                SportType::Unknown => None,
                other => Some(other.to_string()),
            },
        }
    }
}
