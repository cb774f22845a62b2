// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in challenges.

use crate::config::ConfigError;
use crate::models::SportType;
use crate::services::challenge::{Challenge, ChallengeProgress};
use crate::time_utils::{format_duration_hms, TimezoneCache};

/// Target distance of Nedd's challenge: 100 miles.
pub const NEDDS_TARGET_KM: f64 = 160.934;

/// Nedd's Uncomfortable Challenge: 160.9km of anything over ten days.
pub fn nedds(timezones: &TimezoneCache) -> Result<Challenge, ConfigError> {
    Challenge::new(
        "nedds_uncomfortable_challenge",
        format_nedds,
        "20/10/2024",
        "29/10/2024",
        "Australia/Melbourne",
        [],
        timezones,
    )
}

/// Lake Biwa Cycle: ride totals for a week in Japan.
pub fn lake_biwa(timezones: &TimezoneCache) -> Result<Challenge, ConfigError> {
    Challenge::new(
        "lake_biwa_cycle",
        format_lake_biwa,
        "02/11/2025",
        "08/11/2025",
        "Japan",
        [SportType::Ride],
        timezones,
    )
}

/// Every built-in challenge, in chain order.
pub fn builtin(timezones: &TimezoneCache) -> Result<Vec<Challenge>, ConfigError> {
    Ok(vec![nedds(timezones)?, lake_biwa(timezones)?])
}

pub fn format_nedds(p: &ChallengeProgress) -> String {
    format!(
        "Nedd's Uncomfortable Challenge: Day {}/10\n\
         Distance: {:.1}km/160.9km ({:.1}%)\n\
         Total Time: {}",
        p.day,
        p.distance_km,
        p.distance_km / NEDDS_TARGET_KM * 100.0,
        format_duration_hms(p.moving_time)
    )
}

pub fn format_lake_biwa(p: &ChallengeProgress) -> String {
    format!(
        "Lake Biwa Cycle: Day {}\n\
         Total Distance: {:.1}km\n\
         Total Time: {}",
        p.day,
        p.distance_km,
        format_duration_hms(p.moving_time)
    )
}
