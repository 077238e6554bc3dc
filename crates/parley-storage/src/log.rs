// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process mirror of the ordered log, shared by both backends.

use std::sync::Arc;

use parley_core::types::{Message, MessageLog};
use tokio::sync::watch;

/// Publishes log snapshots to subscribers.
///
/// Snapshots handed out are never mutated: appends copy-on-write the inner
/// vector when a subscriber still holds the previous one.
pub(crate) struct LogPublisher {
    tx: watch::Sender<MessageLog>,
}

impl LogPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx }
    }

    /// Inserts after every message with an equal or earlier timestamp.
    pub(crate) fn insert(&self, message: Message) {
        self.tx.send_modify(|log| {
            let log = Arc::make_mut(log);
            let at = log.partition_point(|m| m.sent_at_millis <= message.sent_at_millis);
            log.insert(at, message);
        });
    }

    /// Replaces the whole log, e.g. after loading it from disk.
    pub(crate) fn replace(&self, messages: Vec<Message>) {
        self.tx.send_replace(Arc::new(messages));
    }

    pub(crate) fn snapshot(&self) -> MessageLog {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<MessageLog> {
        self.tx.subscribe()
    }
}
