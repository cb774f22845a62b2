// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use crate::config::ConfigError;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use std::time::Duration;

/// Date literal format used by challenge definitions (`20/10/2024`).
pub const CHALLENGE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a duration as `H:MM:SS`, with hours unbounded.
pub fn format_duration_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Memoizing lookup of IANA timezone names.
///
/// Only names that parse are inserted, so the map never grows past the
/// size of the timezone database. Two threads resolving the same name at
/// once both insert the same value.
#[derive(Default)]
pub struct TimezoneCache {
    zones: DashMap<String, Tz>,
}

impl TimezoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a timezone by name, e.g. `Australia/Melbourne`.
    pub fn resolve(&self, name: &str) -> Result<Tz, ConfigError> {
        if let Some(tz) = self.zones.get(name) {
            return Ok(*tz);
        }

        let tz: Tz = name
            .parse()
            .map_err(|_| ConfigError::Timezone(name.to_string()))?;
        self.zones.insert(name.to_string(), tz);
        tracing::debug!(timezone = name, "Timezone resolved");
        Ok(tz)
    }

    /// Number of cached zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Parse a `DD/MM/YYYY` literal.
pub fn parse_challenge_date(literal: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(literal.trim(), CHALLENGE_DATE_FORMAT)
        .map_err(|e| ConfigError::Date(format!("{literal}: {e}")))
}

/// Step used to walk out of a daylight-saving gap.
const GAP_STEP_MINUTES: i64 = 15;

/// First instant of `date` in `tz`, as UTC.
///
/// When local midnight falls in a daylight-saving gap, the day starts at
/// the first local time that exists.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, ConfigError> {
    local_instant(date, NaiveTime::MIN, tz, TimeDelta::minutes(GAP_STEP_MINUTES))
}

/// Last representable instant of `date` in `tz`, as UTC.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, ConfigError> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| ConfigError::Date("invalid end of day".to_string()))?;
    local_instant(date, last, tz, TimeDelta::minutes(-GAP_STEP_MINUTES))
}

/// Resolve `date` at `time` in `tz`, moving by `step` while the local time
/// does not exist. Gives up once the walk leaves `date`.
fn local_instant(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
    step: TimeDelta,
) -> Result<DateTime<Utc>, ConfigError> {
    let mut local = date.and_time(time);
    while local.date() == date {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return Ok(dt.with_timezone(&Utc));
        }
        local += step;
    }
    Err(ConfigError::Date(format!("{date} {time} does not exist in {tz}")))
}
