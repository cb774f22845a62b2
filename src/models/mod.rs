// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod filter;
pub mod webhook;

pub use activity::{Activity, LatLng, SportType};
pub use credential::Credential;
pub use filter::ActivityFilter;
pub use webhook::{AspectType, EventUpdates, ObjectType, WebhookEvent};
