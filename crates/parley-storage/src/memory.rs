// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile message store. Nothing survives the process.

use async_trait::async_trait;
use tokio::sync::watch;

use parley_core::types::{HealthStatus, Message, MessageLog};
use parley_core::{MessageStore, ParleyError, PluginAdapter};

use crate::log::LogPublisher;

/// Message store held entirely in memory.
pub struct InMemoryStore {
    log: LogPublisher,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            log: LogPublisher::new(),
        }
    }

    /// Creates a store pre-populated with `messages` (in any order).
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let store = Self::new();
        for message in messages {
            store.log.insert(message);
        }
        store
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn initialize(&self) -> Result<(), ParleyError> {
        Ok(())
    }

    async fn append(&self, message: &Message) -> Result<(), ParleyError> {
        self.log.insert(message.clone());
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<Message>, ParleyError> {
        Ok(self.log.snapshot().as_ref().clone())
    }

    fn subscribe(&self) -> watch::Receiver<MessageLog> {
        self.log.subscribe()
    }

    async fn close(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_read_back() {
        let store = InMemoryStore::new();
        store.initialize().await.unwrap();

        let m = Message::sent("hi", 100);
        store.append(&m).await.unwrap();

        assert_eq!(store.messages().await.unwrap(), vec![m]);
        assert_eq!(store.name(), "memory");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn out_of_order_append_lands_in_timestamp_order() {
        let store = InMemoryStore::new();
        store.append(&Message::sent("later", 2_000)).await.unwrap();
        store.append(&Message::received("earlier", 1_000)).await.unwrap();

        let contents: Vec<String> = store
            .messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["earlier", "later"]);
    }

    #[tokio::test]
    async fn subscriber_is_notified_with_full_snapshot() {
        let store = InMemoryStore::with_messages([Message::sent("seed", 0)]);
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.append(&Message::received("next", 10)).await.unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].content, "next");
    }
}
