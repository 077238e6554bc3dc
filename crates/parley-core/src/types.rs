// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store adapters, the timeline and the engine.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        MessageId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the conversation a message belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Written by the local user.
    Sent,
    /// Written by the other party (the auto-reply).
    Received,
}

/// A single immutable entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub direction: Direction,
    /// Milliseconds since the Unix epoch, as reported by the engine's clock.
    pub sent_at_millis: i64,
}

impl Message {
    /// Creates a message with a freshly generated id.
    pub fn new(direction: Direction, content: impl Into<String>, sent_at_millis: i64) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            direction,
            sent_at_millis,
        }
    }

    /// Creates a message written by the local user.
    pub fn sent(content: impl Into<String>, sent_at_millis: i64) -> Self {
        Self::new(Direction::Sent, content, sent_at_millis)
    }

    /// Creates a message written by the other party.
    pub fn received(content: impl Into<String>, sent_at_millis: i64) -> Self {
        Self::new(Direction::Received, content, sent_at_millis)
    }
}

/// Immutable snapshot of the full ordered log, as delivered to subscribers.
pub type MessageLog = Arc<Vec<Message>>;

/// Day and time-of-day parts of a timeline label.
///
/// Formatting beyond these two fields is left to the renderer; the
/// [`Display`](fmt::Display) impl joins them with a space (`"Monday 14:05"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampLabel {
    /// Weekday name, e.g. `Monday`.
    pub day: String,
    /// 24h time of day, e.g. `14:05`.
    pub time: String,
}

impl fmt::Display for TimestampLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time)
    }
}

/// Display metadata derived for one message of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub message: Message,
    /// Present when a time header should be drawn above the message.
    pub timestamp_label: Option<TimestampLabel>,
    /// Draw the message close to the previous one (same-sender burst).
    pub tighten_spacing: bool,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded(reason) => write!(f, "degraded: {reason}"),
            HealthStatus::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}
