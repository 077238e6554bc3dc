// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive durations, non-empty paths, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::{ParleyConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.engine.quiet_period_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.quiet_period_ms must be greater than 0".to_string(),
        });
    }

    if config.timeline.tighten_window_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "timeline.tighten_window_ms must be greater than 0".to_string(),
        });
    }

    if config.timeline.label_gap_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "timeline.label_gap_ms must be greater than 0".to_string(),
        });
    }

    // Durations are compared against i64 millisecond deltas.
    for (key, value) in [
        ("engine.quiet_period_ms", config.engine.quiet_period_ms),
        ("timeline.tighten_window_ms", config.timeline.tighten_window_ms),
        ("timeline.label_gap_ms", config.timeline.label_gap_ms),
    ] {
        if i64::try_from(value).is_err() {
            errors.push(ConfigError::Validation {
                message: format!("{key} is too large, got {value}"),
            });
        }
    }

    // TOML integers are signed, so larger seeds could not be written back out.
    if let Some(seed) = config.engine.scramble_seed {
        if i64::try_from(seed).is_err() {
            errors.push(ConfigError::Validation {
                message: format!("engine.scramble_seed must be at most {}, got {seed}", i64::MAX),
            });
        }
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
