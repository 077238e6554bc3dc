// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derivation of display metadata from the ordered message log.
//!
//! For each message, compared with the one before it:
//! - `tighten_spacing` is set when both share a direction and arrived less
//!   than the tighten window apart (a burst from one side);
//! - `timestamp_label` is set for the first message and whenever the gap
//!   exceeds the label gap.
//!
//! The transform is pure: the same log always yields the same entries.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use parley_config::model::{LabelZone, TimelineConfig};
use parley_core::types::{Message, TimelineEntry, TimestampLabel};

/// Default burst window: 20 seconds.
pub const DEFAULT_TIGHTEN_WINDOW_MS: i64 = 20_000;

/// Default label gap: one hour.
pub const DEFAULT_LABEL_GAP_MS: i64 = 3_600_000;

/// Thresholds and options for [`TimelineRules::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineRules {
    /// Same-direction messages closer than this are tightened.
    pub tighten_window_ms: i64,
    /// Messages further apart than this get a new label.
    pub label_gap_ms: i64,
    /// Whether the first message of the log counts as tightened.
    pub tighten_first_message: bool,
    /// Zone the label's day and time are rendered in.
    pub label_zone: LabelZone,
}

impl Default for TimelineRules {
    fn default() -> Self {
        Self {
            tighten_window_ms: DEFAULT_TIGHTEN_WINDOW_MS,
            label_gap_ms: DEFAULT_LABEL_GAP_MS,
            tighten_first_message: false,
            label_zone: LabelZone::default(),
        }
    }
}

impl TimelineRules {
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self {
            tighten_window_ms: i64::try_from(config.tighten_window_ms).unwrap_or(i64::MAX),
            label_gap_ms: i64::try_from(config.label_gap_ms).unwrap_or(i64::MAX),
            tighten_first_message: config.tighten_first_message,
            label_zone: config.label_zone,
        }
    }

    /// One entry per message, same order.
    pub fn transform(&self, messages: &[Message]) -> Vec<TimelineEntry> {
        let mut entries = Vec::with_capacity(messages.len());
        let mut previous: Option<&Message> = None;

        for message in messages {
            let (tighten_spacing, labelled) = match previous {
                None => (self.tighten_first_message, true),
                Some(prev) => {
                    let delta = message.sent_at_millis.saturating_sub(prev.sent_at_millis);
                    (
                        prev.direction == message.direction && delta < self.tighten_window_ms,
                        delta > self.label_gap_ms,
                    )
                }
            };

            entries.push(TimelineEntry {
                message: message.clone(),
                timestamp_label: labelled.then(|| self.label_for(message.sent_at_millis)),
                tighten_spacing,
            });
            previous = Some(message);
        }

        entries
    }

    /// Label for a Unix-millisecond timestamp in the configured zone.
    pub fn label_for(&self, sent_at_millis: i64) -> TimestampLabel {
        let utc = DateTime::<Utc>::from_timestamp_millis(sent_at_millis).unwrap_or_default();
        match self.label_zone {
            LabelZone::Utc => label_from(&utc),
            LabelZone::Local => label_from(&utc.with_timezone(&Local)),
        }
    }
}

fn label_from<Tz>(at: &DateTime<Tz>) -> TimestampLabel
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    TimestampLabel {
        day: at.format("%A").to_string(),
        time: at.format("%H:%M").to_string(),
    }
}

/// [`TimelineRules::transform`] with default rules.
pub fn transform(messages: &[Message]) -> Vec<TimelineEntry> {
    TimelineRules::default().transform(messages)
}
