// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper for credential persistence.

use crate::db::collections;
use crate::error::AppError;
use crate::services::credentials::{CredentialError, CredentialStore};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credential document, keyed by athlete ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Serialized credential (JSON)
    pub payload: String,
    /// When the document was last written (RFC3339)
    pub updated_at: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator takes an unauthenticated connection.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Get the credential document for an athlete.
    pub async fn get_credential(
        &self,
        athlete_id: u64,
    ) -> Result<Option<StoredCredential>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CREDENTIALS)
            .obj()
            .one(&athlete_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store (overwrite) the credential document for an athlete.
    pub async fn set_credential(
        &self,
        athlete_id: u64,
        credential: &StoredCredential,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .document_id(athlete_id.to_string())
            .object(credential)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FirestoreDb {
    async fn load(&self, athlete_id: u64) -> Result<Option<Vec<u8>>, CredentialError> {
        let stored = self
            .get_credential(athlete_id)
            .await
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        Ok(stored.map(|s| s.payload.into_bytes()))
    }

    async fn save(&self, athlete_id: u64, payload: Vec<u8>) -> Result<(), CredentialError> {
        let payload = String::from_utf8(payload)
            .map_err(|e| CredentialError::Store(format!("payload is not UTF-8: {}", e)))?;

        let document = StoredCredential {
            payload,
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.set_credential(athlete_id, &document)
            .await
            .map_err(|e| CredentialError::Store(e.to_string()))
    }
}
