// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date-range and sport-type predicate over activities.

use super::activity::{Activity, SportType};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Selects activities by start time and sport type.
///
/// The same filter decides whether a rule applies to the triggering
/// activity and which historical activities count toward an aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    /// Inclusive lower bound; unbounded when `None`
    pub after: Option<DateTime<Utc>>,
    /// Inclusive upper bound; unbounded when `None`
    pub before: Option<DateTime<Utc>>,
    /// Accepted sport types; empty accepts every type
    pub sport_types: HashSet<SportType>,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(mut self, after: DateTime<Utc>) -> Self {
        self.after = Some(after);
        self
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn sport_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = SportType>,
    {
        self.sport_types = types.into_iter().collect();
        self
    }

    /// Whether `activity` passes every configured check.
    pub fn matches(&self, activity: &Activity) -> bool {
        if let Some(after) = self.after {
            if activity.start_date < after {
                tracing::debug!(activity_id = activity.id, "Activity starts before window");
                return false;
            }
        }

        if let Some(before) = self.before {
            if activity.start_date > before {
                tracing::debug!(activity_id = activity.id, "Activity starts after window");
                return false;
            }
        }

        if !self.sport_types.is_empty() && !self.sport_types.contains(&activity.sport_type) {
            tracing::debug!(
                activity_id = activity.id,
                sport_type = %activity.sport_type,
                "Sport type not accepted"
            );
            return false;
        }

        true
    }
}
