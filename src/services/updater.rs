// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ordered chain of activity rules.
//!
//! Each [`Updater`] takes the activity produced by the previous one, so
//! later rules observe (and may override) earlier rules' changes. The
//! chain reports whether the final activity differs from the input; the
//! caller writes back at most once.

use crate::error::Result;
use crate::models::Activity;
use crate::services::strava::ActivityClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Per-invocation information handed to every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Owner of the activity being processed
    pub athlete_id: u64,
}

/// A transformation over an activity.
///
/// Rules hold only their construction-time configuration. An error from a
/// rule aborts the whole chain.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn apply(
        &self,
        ctx: &RuleContext,
        client: &dyn ActivityClient,
        activity: Activity,
    ) -> Result<Activity>;
}

/// Result of running the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub activity: Activity,
    pub changed: bool,
}

/// Rules applied in configuration order.
#[derive(Clone, Default)]
pub struct UpdaterChain {
    updaters: Vec<Arc<dyn Updater>>,
}

impl UpdaterChain {
    pub fn new(updaters: Vec<Arc<dyn Updater>>) -> Self {
        Self { updaters }
    }

    /// Append a rule; it runs after every rule already in the chain.
    pub fn push(&mut self, updater: Arc<dyn Updater>) {
        self.updaters.push(updater);
    }

    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }

    /// Rule names in order.
    pub fn names(&self) -> Vec<&str> {
        self.updaters.iter().map(|u| u.name()).collect()
    }

    /// Fold `activity` through every rule and compare the result with the input.
    pub async fn run(
        &self,
        ctx: &RuleContext,
        client: &dyn ActivityClient,
        activity: Activity,
    ) -> Result<ChainOutcome> {
        let original = activity.clone();
        let mut current = activity;

        for updater in &self.updaters {
            current = updater.apply(ctx, client, current).await.map_err(|e| {
                tracing::error!(
                    athlete_id = ctx.athlete_id,
                    activity_id = original.id,
                    rule = updater.name(),
                    error = %e,
                    "Rule failed"
                );
                e
            })?;
        }

        let changed = current != original;
        tracing::info!(
            athlete_id = ctx.athlete_id,
            activity_id = original.id,
            changed,
            "Rule chain finished"
        );

        Ok(ChainOutcome {
            activity: current,
            changed,
        })
    }
}
