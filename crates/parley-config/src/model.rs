// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Parley.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Auto-reply scheduling settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Timeline grouping rules.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Message store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Auto-reply scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Quiet period after a sent message before the reply fires, in milliseconds.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Whether sent messages schedule an auto-reply at all.
    #[serde(default = "default_auto_reply")]
    pub auto_reply: bool,

    /// Fixed seed for the reply scrambler. `None` seeds from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scramble_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
            auto_reply: default_auto_reply(),
            scramble_seed: None,
        }
    }
}

fn default_quiet_period_ms() -> u64 {
    5_000
}

fn default_auto_reply() -> bool {
    true
}

/// Time zone used to derive timestamp labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelZone {
    /// The host's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// Timeline grouping configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineConfig {
    /// Same-direction messages closer than this are drawn tightened, in milliseconds.
    #[serde(default = "default_tighten_window_ms")]
    pub tighten_window_ms: u64,

    /// A gap longer than this starts a new labelled section, in milliseconds.
    #[serde(default = "default_label_gap_ms")]
    pub label_gap_ms: u64,

    /// Tighten the very first message of the log as well.
    #[serde(default)]
    pub tighten_first_message: bool,

    /// Time zone for the day and time parts of labels.
    #[serde(default)]
    pub label_zone: LabelZone,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            tighten_window_ms: default_tighten_window_ms(),
            label_gap_ms: default_label_gap_ms(),
            tighten_first_message: false,
            label_zone: LabelZone::default(),
        }
    }
}

fn default_tighten_window_ms() -> u64 {
    20_000
}

fn default_label_gap_ms() -> u64 {
    3_600_000
}

/// Which message store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite file at `database_path`.
    #[default]
    Sqlite,
    /// Process-local log, lost on exit.
    Memory,
}

/// Message store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend used for the message log.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
