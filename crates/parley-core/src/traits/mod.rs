// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the collaborators of the chat engine.
//!
//! Backends extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod clock;
pub mod storage;

pub use adapter::PluginAdapter;
pub use clock::Clock;
pub use storage::MessageStore;
