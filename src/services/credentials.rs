// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-athlete credential cache with refresh on expiry.
//!
//! Credentials are persisted as JSON bytes in a [`CredentialStore`]. Reading
//! an expired credential triggers a refresh through a [`TokenRefresher`] and
//! the refreshed credential overwrites the stored one. There is no retry
//! here; Strava redelivering the webhook is the retry.

use crate::models::Credential;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Failures surfaced by [`CredentialCache`].
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No credential stored for athlete {0}")]
    NotFound(u64),

    #[error("Stored credential is unreadable: {0}")]
    Decode(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Credential store error: {0}")]
    Store(String),
}

/// Key/value persistence for serialized credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self, athlete_id: u64) -> Result<Option<Vec<u8>>, CredentialError>;
    async fn save(&self, athlete_id: u64, payload: Vec<u8>) -> Result<(), CredentialError>;
}

/// Exchanges an expired credential for a fresh one.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, CredentialError>;
}

/// In-process store, used for local runs and tests.
#[derive(Default, Clone)]
pub struct MemoryCredentialStore {
    entries: Arc<DashMap<u64, Vec<u8>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, athlete_id: u64) -> Result<Option<Vec<u8>>, CredentialError> {
        Ok(self.entries.get(&athlete_id).map(|e| e.value().clone()))
    }

    async fn save(&self, athlete_id: u64, payload: Vec<u8>) -> Result<(), CredentialError> {
        self.entries.insert(athlete_id, payload);
        Ok(())
    }
}

/// Reads credentials, refreshing and re-storing them when expired.
#[derive(Clone)]
pub struct CredentialCache {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    /// Per-athlete mutex so one process refreshes a token at most once.
    refresh_locks: Arc<DashMap<u64, Arc<Mutex<()>>>>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Get a usable credential for `athlete_id`.
    pub async fn get_credential(&self, athlete_id: u64) -> Result<Credential, CredentialError> {
        let credential = self.load(athlete_id).await?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        let lock = self
            .refresh_locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have refreshed while we were waiting.
        let credential = self.load(athlete_id).await?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        tracing::info!(athlete_id, "Access token expired, refreshing");
        let refreshed = self.refresher.refresh(&credential).await?;

        if let Err(e) = self.store_credential(athlete_id, &refreshed).await {
            tracing::warn!(
                error = %e,
                athlete_id,
                "Failed to persist refreshed credential, using it anyway"
            );
        } else {
            tracing::info!(athlete_id, "Token refreshed and stored");
        }

        Ok(refreshed)
    }

    /// Persist `credential` for `athlete_id`, replacing any previous value.
    pub async fn store_credential(
        &self,
        athlete_id: u64,
        credential: &Credential,
    ) -> Result<(), CredentialError> {
        let payload =
            serde_json::to_vec(credential).map_err(|e| CredentialError::Store(e.to_string()))?;
        self.store.save(athlete_id, payload).await
    }

    async fn load(&self, athlete_id: u64) -> Result<Credential, CredentialError> {
        let payload = self
            .store
            .load(athlete_id)
            .await?
            .ok_or(CredentialError::NotFound(athlete_id))?;

        serde_json::from_slice(&payload).map_err(|e| CredentialError::Decode(e.to_string()))
    }
}
