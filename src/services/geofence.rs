// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home/work geofence and the two rules built on it.
//!
//! "Near" is a per-axis box around the reference point, not a geodesic
//! radius.

use crate::config::{GeofenceConfig, GeofenceRuleKind};
use crate::error::Result;
use crate::models::{Activity, LatLng, SportType};
use crate::services::strava::ActivityClient;
use crate::services::updater::{RuleContext, Updater};
use async_trait::async_trait;
use geo::{coord, Intersects, Rect};
use std::sync::Arc;

/// Classifies rides between two reference points as commutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    home: Rect<f64>,
    work: Rect<f64>,
}

impl Geofence {
    pub fn new(home: LatLng, work: LatLng, margin: f64) -> Self {
        Self {
            home: bounding_box(home, margin),
            work: bounding_box(work, margin),
        }
    }

    pub fn from_config(config: &GeofenceConfig) -> Self {
        Self::new(config.home, config.work, config.margin)
    }

    /// Whether `activity` is a ride from home to work or from work to home.
    pub fn is_commute(&self, activity: &Activity) -> bool {
        if activity.sport_type != SportType::Ride {
            tracing::debug!(
                activity_id = activity.id,
                sport_type = %activity.sport_type,
                "Not a ride, not a commute"
            );
            return false;
        }

        if activity.start_latlng.is_unknown() || activity.end_latlng.is_unknown() {
            tracing::debug!(
                activity_id = activity.id,
                "Missing start or end location, not a commute"
            );
            return false;
        }

        let (start, end) = (activity.start_latlng, activity.end_latlng);
        let commute = (is_within(&self.home, start) && is_within(&self.work, end))
            || (is_within(&self.work, start) && is_within(&self.home, end));

        tracing::debug!(activity_id = activity.id, commute, "Geofence classification");
        commute
    }
}

/// Whether `point` lies within `margin` degrees of `reference` on both axes.
pub fn is_near(point: LatLng, reference: LatLng, margin: f64) -> bool {
    is_within(&bounding_box(reference, margin), point)
}

fn bounding_box(center: LatLng, margin: f64) -> Rect<f64> {
    Rect::new(
        coord! { x: center.lng - margin, y: center.lat - margin },
        coord! { x: center.lng + margin, y: center.lat + margin },
    )
}

fn is_within(rect: &Rect<f64>, point: LatLng) -> bool {
    rect.intersects(&coord! { x: point.lng, y: point.lat })
}

/// Writes the commute classification into the `commute` flag.
pub struct MarkCommute {
    geofence: Geofence,
}

impl MarkCommute {
    pub fn new(geofence: Geofence) -> Self {
        Self { geofence }
    }
}

#[async_trait]
impl Updater for MarkCommute {
    fn name(&self) -> &str {
        "mark_commute"
    }

    async fn apply(
        &self,
        _ctx: &RuleContext,
        _client: &dyn ActivityClient,
        mut activity: Activity,
    ) -> Result<Activity> {
        activity.commute = self.geofence.is_commute(&activity);
        Ok(activity)
    }
}

/// Writes the commute classification into the `hidden` flag, keeping
/// commutes off followers' home feeds.
pub struct HideCommute {
    geofence: Geofence,
}

impl HideCommute {
    pub fn new(geofence: Geofence) -> Self {
        Self { geofence }
    }
}

#[async_trait]
impl Updater for HideCommute {
    fn name(&self) -> &str {
        "hide_commute"
    }

    async fn apply(
        &self,
        _ctx: &RuleContext,
        _client: &dyn ActivityClient,
        mut activity: Activity,
    ) -> Result<Activity> {
        activity.hidden = self.geofence.is_commute(&activity);
        Ok(activity)
    }
}

/// Build the configured geofence rules, in order.
pub fn rules(config: &GeofenceConfig, kinds: &[GeofenceRuleKind]) -> Vec<Arc<dyn Updater>> {
    let geofence = Geofence::from_config(config);
    kinds
        .iter()
        .map(|kind| -> Arc<dyn Updater> {
            match kind {
                GeofenceRuleKind::Hide => Arc::new(HideCommute::new(geofence)),
                GeofenceRuleKind::Commute => Arc::new(MarkCommute::new(geofence)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GEOFENCE_MARGIN;
    use chrono::Utc;

    const ORIGIN: LatLng = LatLng::new(0.0, 0.0);

    fn ride(start: LatLng, end: LatLng) -> Activity {
        let mut a = Activity::new(1, Utc::now());
        a.sport_type = SportType::Ride;
        a.start_latlng = start;
        a.end_latlng = end;
        a
    }

    #[test]
    fn test_is_near_margin() {
        let m = DEFAULT_GEOFENCE_MARGIN;
        assert!(is_near(LatLng::new(0.0, 0.0), ORIGIN, m));
        assert!(!is_near(LatLng::new(0.006, 0.0), ORIGIN, m));
        assert!(is_near(LatLng::new(0.005, 0.0), ORIGIN, m));
        assert!(is_near(LatLng::new(-0.005, 0.005), ORIGIN, m));
        assert!(!is_near(LatLng::new(0.0, -0.006), ORIGIN, m));
    }

    #[test]
    fn test_is_near_is_a_box_not_a_circle() {
        // Corner of the box is ~0.0071 degrees away but still counts.
        assert!(is_near(LatLng::new(0.005, 0.005), ORIGIN, 0.005));
    }

    #[test]
    fn test_commute_requires_both_endpoints() {
        let home = LatLng::new(-37.80, 144.95);
        let work = LatLng::new(-37.82, 144.97);
        let geofence = Geofence::new(home, work, DEFAULT_GEOFENCE_MARGIN);

        assert!(geofence.is_commute(&ride(home, work)));
        assert!(geofence.is_commute(&ride(work, home)));
        assert!(!geofence.is_commute(&ride(home, home)));
        assert!(!geofence.is_commute(&ride(home, LatLng::new(-37.0, 145.0))));
    }

    #[test]
    fn test_work_far_from_home_is_not_commute() {
        let near_home = LatLng::new(0.001, 0.001);
        let geofence = Geofence::new(ORIGIN, LatLng::new(1.0, 1.0), DEFAULT_GEOFENCE_MARGIN);
        assert!(!geofence.is_commute(&ride(near_home, near_home)));
    }

    #[test]
    fn test_coincident_home_and_work_is_commute_either_way() {
        let near_home = LatLng::new(0.001, 0.001);
        let geofence = Geofence::new(ORIGIN, ORIGIN, DEFAULT_GEOFENCE_MARGIN);
        assert!(geofence.is_commute(&ride(near_home, LatLng::new(-0.002, 0.003))));
        assert!(geofence.is_commute(&ride(LatLng::new(-0.002, 0.003), near_home)));
    }

    #[test]
    fn test_non_ride_is_never_commute() {
        let geofence = Geofence::new(ORIGIN, ORIGIN, DEFAULT_GEOFENCE_MARGIN);
        let mut run = ride(LatLng::new(0.001, 0.0), LatLng::new(0.0, 0.001));
        run.sport_type = SportType::Run;
        assert!(!geofence.is_commute(&run));
    }

    #[test]
    fn test_unknown_location_is_never_commute() {
        // A home at the sentinel must not turn every indoor ride into a commute.
        let geofence = Geofence::new(ORIGIN, ORIGIN, DEFAULT_GEOFENCE_MARGIN);
        assert!(!geofence.is_commute(&ride(LatLng::UNKNOWN, LatLng::new(0.001, 0.0))));
        assert!(!geofence.is_commute(&ride(LatLng::new(0.001, 0.0), LatLng::UNKNOWN)));
    }

    #[test]
    fn test_rules_follow_configured_order() {
        let config = GeofenceConfig {
            home: ORIGIN,
            work: ORIGIN,
            margin: DEFAULT_GEOFENCE_MARGIN,
        };
        let names: Vec<String> = rules(
            &config,
            &[GeofenceRuleKind::Commute, GeofenceRuleKind::Hide],
        )
        .iter()
        .map(|r| r.name().to_string())
        .collect();
        assert_eq!(names, ["mark_commute", "hide_commute"]);

        assert!(rules(&config, &[]).is_empty());
    }
}
