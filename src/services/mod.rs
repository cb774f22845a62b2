// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod challenge;
pub mod challenges;
pub mod credentials;
pub mod geofence;
pub mod strava;
pub mod updater;

pub use activity::{ActivityProcessor, ProcessResult};
pub use challenge::{Challenge, ChallengeProgress};
pub use credentials::{
    CredentialCache, CredentialError, CredentialStore, MemoryCredentialStore, TokenRefresher,
};
pub use geofence::{Geofence, HideCommute, MarkCommute};
pub use strava::{ActivityClient, AuthorizedClient, StravaClient};
pub use updater::{ChainOutcome, RuleContext, Updater, UpdaterChain};
