// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use commuter::config::Config;
use commuter::db::FirestoreDb;
use commuter::error::{AppError, Result};
use commuter::models::{Activity, ActivityFilter, Credential};
use commuter::routes::create_router;
use commuter::services::{
    ActivityClient, ActivityProcessor, CredentialCache, CredentialError, CredentialStore,
    MemoryCredentialStore, StravaClient, TokenRefresher, UpdaterChain,
};
use commuter::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory stand-in for Strava's activity endpoints.
///
/// Updates are recorded and also written back, so a second run sees the
/// result of the first.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockActivityClient {
    activities: Mutex<HashMap<u64, Activity>>,
    pub list_calls: AtomicUsize,
    pub updates: Mutex<Vec<Activity>>,
    pub fail_list: bool,
}

#[allow(dead_code)]
impl MockActivityClient {
    pub fn new<I: IntoIterator<Item = Activity>>(activities: I) -> Self {
        Self {
            activities: Mutex::new(activities.into_iter().map(|a| (a.id, a)).collect()),
            ..Default::default()
        }
    }

    pub fn failing_list<I: IntoIterator<Item = Activity>>(activities: I) -> Self {
        Self {
            fail_list: true,
            ..Self::new(activities)
        }
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: u64) -> Option<Activity> {
        self.activities.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ActivityClient for MockActivityClient {
    async fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        self.stored(activity_id)
            .ok_or_else(|| AppError::StravaApi(format!("HTTP 404 Not Found: {}", activity_id)))
    }

    async fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(AppError::StravaApi("HTTP 500: boom".to_string()));
        }
        let mut matching: Vec<Activity> = self
            .activities
            .lock()
            .unwrap()
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.id);
        Ok(matching)
    }

    async fn update_activity(&self, activity: &Activity) -> Result<()> {
        self.updates.lock().unwrap().push(activity.clone());
        self.activities
            .lock()
            .unwrap()
            .insert(activity.id, activity.clone());
        Ok(())
    }
}

/// Refresher that hands out a fixed credential and counts calls.
#[allow(dead_code)]
pub struct StaticRefresher {
    pub credential: Credential,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticRefresher {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for StaticRefresher {
    async fn refresh(
        &self,
        _credential: &Credential,
    ) -> std::result::Result<Credential, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credential.clone())
    }
}

/// Refresher that always fails.
#[allow(dead_code)]
pub struct FailingRefresher;

#[async_trait]
impl TokenRefresher for FailingRefresher {
    async fn refresh(
        &self,
        _credential: &Credential,
    ) -> std::result::Result<Credential, CredentialError> {
        Err(CredentialError::Refresh("invalid_grant".to_string()))
    }
}

/// Credential expiring `expires_in` from now.
#[allow(dead_code)]
pub fn credential(access_token: &str, expires_in: Duration) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: format!("{}-refresh", access_token),
        expires_at: Utc::now() + expires_in,
    }
}

/// Write `credential` straight into `store`.
#[allow(dead_code)]
pub async fn seed_credential(store: &dyn CredentialStore, athlete_id: u64, credential: &Credential) {
    store
        .save(athlete_id, serde_json::to_vec(credential).unwrap())
        .await
        .unwrap();
}

/// Activity with the given type, start, distance (km) and moving time (s).
#[allow(dead_code)]
pub fn activity(
    id: u64,
    sport_type: &str,
    start: DateTime<Utc>,
    distance_km: f64,
    moving_secs: u64,
) -> Activity {
    let mut a = Activity::new(id, start);
    a.name = format!("Activity {}", id);
    a.sport_type = sport_type.into();
    a.distance_km = distance_km;
    a.moving_time = std::time::Duration::from_secs(moving_secs);
    a.elapsed_time = a.moving_time;
    a
}

/// Create a test app talking to `strava_url` (a mockito server) with an
/// in-memory credential store.
#[allow(dead_code)]
pub fn create_test_app(
    strava_url: &str,
    config: Config,
    chain: UpdaterChain,
) -> (axum::Router, Arc<AppState>, MemoryCredentialStore) {
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    )
    .with_urls(&format!("{}/api/v3", strava_url), &format!("{}/oauth", strava_url));

    let store = MemoryCredentialStore::new();
    let credentials = CredentialCache::new(Arc::new(store.clone()), Arc::new(strava.clone()));
    let processor = ActivityProcessor::new(strava.clone(), credentials, chain);

    let state = Arc::new(AppState {
        config,
        strava,
        processor,
    });

    (create_router(state.clone()), state, store)
}
