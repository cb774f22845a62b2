// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity processing service.
//!
//! Handles the core workflow for one webhook notification:
//! 1. Resolve (and refresh if needed) the owner's credential
//! 2. Fetch the activity from Strava
//! 3. Run the rule chain
//! 4. Write the activity back, only if a rule changed it

use crate::error::Result;
use crate::services::credentials::CredentialCache;
use crate::services::strava::{ActivityClient, StravaClient};
use crate::services::updater::{RuleContext, UpdaterChain};

/// Runs the rule chain against activities named by webhook events.
#[derive(Clone)]
pub struct ActivityProcessor {
    strava: StravaClient,
    credentials: CredentialCache,
    chain: UpdaterChain,
}

impl ActivityProcessor {
    pub fn new(strava: StravaClient, credentials: CredentialCache, chain: UpdaterChain) -> Self {
        Self {
            strava,
            credentials,
            chain,
        }
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    pub fn chain(&self) -> &UpdaterChain {
        &self.chain
    }

    /// Process an activity by ID on behalf of its owner.
    pub async fn process_activity(
        &self,
        athlete_id: u64,
        activity_id: u64,
    ) -> Result<ProcessResult> {
        tracing::info!(athlete_id, activity_id, "Processing activity");

        let result = self.process_authorized(athlete_id, activity_id).await;
        if let Err(e) = &result {
            if e.is_strava_token_error() {
                tracing::warn!(
                    athlete_id,
                    error = %e,
                    "Strava rejected the athlete's token, athlete must re-authorize via /strava/login"
                );
            }
        }
        result
    }

    async fn process_authorized(
        &self,
        athlete_id: u64,
        activity_id: u64,
    ) -> Result<ProcessResult> {
        let credential = self.credentials.get_credential(athlete_id).await?;
        let client = self.strava.authorized(&credential.access_token);

        process_with_client(&self.chain, &client, athlete_id, activity_id).await
    }
}

/// Fetch, transform and conditionally update one activity.
///
/// Issues exactly one update when the chain reports a change, none otherwise.
pub async fn process_with_client(
    chain: &UpdaterChain,
    client: &dyn ActivityClient,
    athlete_id: u64,
    activity_id: u64,
) -> Result<ProcessResult> {
    let activity = client.get_activity(activity_id).await?;

    let ctx = RuleContext { athlete_id };
    let outcome = chain.run(&ctx, client, activity).await?;

    if outcome.changed {
        client.update_activity(&outcome.activity).await?;
        tracing::info!(athlete_id, activity_id, "Activity updated");
    } else {
        tracing::debug!(athlete_id, activity_id, "No changes, skipping update");
    }

    Ok(ProcessResult {
        activity_id,
        updated: outcome.changed,
    })
}

/// Result of processing an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub activity_id: u64,
    pub updated: bool,
}
