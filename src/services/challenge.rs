// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-boxed challenge rules.
//!
//! A [`Challenge`] is built from a date window, a timezone, an optional set
//! of sport types and a text formatter. When an activity inside the window
//! arrives, every activity in the window is summed and the activity's
//! description is replaced with the formatted running totals.

use crate::config::ConfigError;
use crate::error::Result;
use crate::models::{Activity, ActivityFilter, SportType};
use crate::services::strava::ActivityClient;
use crate::services::updater::{RuleContext, Updater};
use crate::time_utils::{end_of_day, parse_challenge_date, start_of_day, TimezoneCache};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Totals handed to a challenge's formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeProgress {
    /// 1-based day of the challenge the activity falls on
    pub day: i64,
    pub distance_km: f64,
    pub moving_time: Duration,
}

/// Renders progress as an activity description.
pub type ProgressFormatter = Box<dyn Fn(&ChallengeProgress) -> String + Send + Sync>;

/// Challenge rule.
pub struct Challenge {
    name: String,
    start: DateTime<Utc>,
    filter: ActivityFilter,
    formatter: ProgressFormatter,
}

impl Challenge {
    /// Build a challenge from `DD/MM/YYYY` date literals in timezone `tz_name`.
    ///
    /// The window runs from the start of `start_date` to the end of
    /// `end_date`. An empty `sport_types` accepts every sport type.
    pub fn new<F, I>(
        name: &str,
        formatter: F,
        start_date: &str,
        end_date: &str,
        tz_name: &str,
        sport_types: I,
        timezones: &TimezoneCache,
    ) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&ChallengeProgress) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = SportType>,
    {
        let tz = timezones.resolve(tz_name)?;
        let start = start_of_day(parse_challenge_date(start_date)?, tz)?;
        let end = end_of_day(parse_challenge_date(end_date)?, tz)?;

        if end < start {
            return Err(ConfigError::Date(format!(
                "{name}: end {end_date} is before start {start_date}"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            start,
            filter: ActivityFilter::new()
                .after(start)
                .before(end)
                .sport_types(sport_types),
            formatter: Box::new(formatter),
        })
    }

    /// Filter shared by the applicability check and the aggregation.
    pub fn filter(&self) -> &ActivityFilter {
        &self.filter
    }

    /// 1-based challenge day of `at`.
    pub fn day_of(&self, at: DateTime<Utc>) -> i64 {
        let seconds = (at - self.start).num_seconds();
        seconds.div_euclid(24 * 60 * 60) + 1
    }

    /// Sum distance and moving time over `activities` that pass the filter.
    pub fn totals<'a, I>(&self, activities: I) -> (f64, Duration)
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        activities
            .into_iter()
            .filter(|a| self.filter.matches(a))
            .fold((0.0, Duration::ZERO), |(km, time), a| {
                (km + a.distance_km, time + a.moving_time)
            })
    }
}

#[async_trait]
impl Updater for Challenge {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(
        &self,
        ctx: &RuleContext,
        client: &dyn ActivityClient,
        mut activity: Activity,
    ) -> Result<Activity> {
        if !self.filter.matches(&activity) {
            tracing::debug!(
                challenge = %self.name,
                activity_id = activity.id,
                "Challenge does not apply"
            );
            return Ok(activity);
        }

        let day = self.day_of(activity.start_date);

        // The triggering activity is already stored on Strava, so it is
        // part of the listing.
        let history = client.list_activities(&self.filter).await?;
        let (distance_km, moving_time) = self.totals(&history);

        tracing::info!(
            challenge = %self.name,
            athlete_id = ctx.athlete_id,
            activity_id = activity.id,
            day,
            activities = history.len(),
            distance_km,
            "Challenge totals computed"
        );

        activity.description = (self.formatter)(&ChallengeProgress {
            day,
            distance_km,
            moving_time,
        });
        Ok(activity)
    }
}
