// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity model shared by the Strava client and the rule chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A latitude/longitude pair in degrees.
///
/// `(0, 0)` is the "unknown location" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const UNKNOWN: LatLng = LatLng { lat: 0.0, lng: 0.0 };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Build from Strava's `[lat, lng]` array, which is empty for indoor activities.
    pub fn from_strava(pair: Option<&[f64]>) -> Self {
        match pair {
            Some([lat, lng]) => Self::new(*lat, *lng),
            _ => Self::UNKNOWN,
        }
    }
}

/// Strava sport type.
///
/// Only the types rules branch on get their own variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SportType {
    Ride,
    Run,
    Walk,
    #[default]
    Unknown,
    Other(String),
}

impl SportType {
    pub fn as_str(&self) -> &str {
        match self {
            SportType::Ride => "Ride",
            SportType::Run => "Run",
            SportType::Walk => "Walk",
            SportType::Unknown => "",
            SportType::Other(s) => s,
        }
    }
}

impl From<String> for SportType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Ride" => SportType::Ride,
            "Run" => SportType::Run,
            "Walk" => SportType::Walk,
            "" => SportType::Unknown,
            _ => SportType::Other(value),
        }
    }
}

impl From<&str> for SportType {
    fn from(value: &str) -> Self {
        SportType::from(value.to_string())
    }
}

impl From<SportType> for String {
    fn from(value: SportType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded exercise session.
///
/// Rules may change the first block of fields. The rest describe the
/// recording and are never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub sport_type: SportType,
    pub commute: bool,
    /// Strava's `hide_from_home`
    pub hidden: bool,

    /// Strava activity ID
    pub id: u64,
    pub start_date: DateTime<Utc>,
    pub distance_km: f64,
    pub moving_time: Duration,
    pub elapsed_time: Duration,
    pub start_latlng: LatLng,
    pub end_latlng: LatLng,
}

impl Activity {
    /// Empty activity with the given ID and start time, mostly useful as a builder base.
    pub fn new(id: u64, start_date: DateTime<Utc>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            sport_type: SportType::Unknown,
            commute: false,
            hidden: false,
            id,
            start_date,
            distance_km: 0.0,
            moving_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            start_latlng: LatLng::UNKNOWN,
            end_latlng: LatLng::UNKNOWN,
        }
    }
}
