// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for the canonical conversation log.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Message, MessageLog};

/// Append-only, time-ordered collection of messages.
///
/// The store owns the canonical order (ascending `sent_at_millis`, ties in
/// insertion order). Every change is published to subscribers as a full
/// immutable snapshot; a subscriber that falls behind only sees the most
/// recent state.
#[async_trait]
pub trait MessageStore: PluginAdapter {
    /// Initializes the backend (migrations, loading the existing log).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Appends a message, failing with [`ParleyError::Store`] on I/O failure.
    async fn append(&self, message: &Message) -> Result<(), ParleyError>;

    /// Returns the current ordered log.
    async fn messages(&self) -> Result<Vec<Message>, ParleyError>;

    /// Subscribes to log changes. The receiver starts at the current snapshot.
    fn subscribe(&self) -> watch::Receiver<MessageLog>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;
}
