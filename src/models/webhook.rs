// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava webhook event payload.

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of object an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Activity,
    Athlete,
    #[serde(other)]
    Other,
}

/// What happened to the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Other,
}

/// Fields changed by an `update` event.
///
/// Strava sends booleans as strings (`"private": "true"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventUpdates {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub private: Option<bool>,
    #[serde(default, rename = "type")]
    pub sport_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub authorized: Option<bool>,
}

/// Webhook notification body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub aspect_type: AspectType,
    #[serde(default)]
    pub event_time: i64,
    pub object_id: u64,
    pub object_type: ObjectType,
    pub owner_id: u64,
    #[serde(default)]
    pub subscription_id: u64,
    #[serde(default)]
    pub updates: EventUpdates,
}

impl WebhookEvent {
    /// Only created or updated activities run through the rule chain.
    pub fn is_actionable(&self) -> bool {
        self.object_type == ObjectType::Activity
            && matches!(self.aspect_type, AspectType::Create | AspectType::Update)
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b)),
        Some(serde_json::Value::String(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        },
        Some(other) => Err(D::Error::custom(format!("invalid boolean: {other}"))),
    }
}
