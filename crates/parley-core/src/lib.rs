// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat timeline.
//!
//! This crate provides the domain types, the error type and the collaborator
//! traits (message store, clock) used throughout the Parley workspace. Store
//! backends implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{
    Direction, HealthStatus, Message, MessageId, MessageLog, TimelineEntry, TimestampLabel,
};

pub use traits::{Clock, MessageStore, PluginAdapter};
