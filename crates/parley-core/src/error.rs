// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat timeline.

use thiserror::Error;

/// The primary error type used across Parley adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Message store failures (database connection, query failure, append rejected).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input rejected before anything was written.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Wraps any error as a [`ParleyError::Store`].
    pub fn store<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ParleyError::Store { source: err.into() }
    }

    /// Returns `true` for persistence failures.
    pub fn is_store(&self) -> bool {
        matches!(self, ParleyError::Store { .. })
    }
}
