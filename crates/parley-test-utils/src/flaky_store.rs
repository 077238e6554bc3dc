// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store with injectable append failures.
//!
//! `FlakyStore` wraps an [`InMemoryStore`] and fails appends on demand:
//! either the next one, or every append of a given direction. Appends can
//! also be slowed down to stand in for a busy disk.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use parley_core::types::{Direction, HealthStatus, Message, MessageLog};
use parley_core::{MessageStore, ParleyError, PluginAdapter};
use parley_storage::InMemoryStore;

/// In-memory store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_next: AtomicBool,
    fail_direction: Mutex<Option<Direction>>,
    attempts: AtomicUsize,
    latency_ms: AtomicU64,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next append fails, later ones succeed.
    pub fn fail_next_append(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Every append of `direction` fails until [`clear_failures`](Self::clear_failures).
    pub fn fail_direction(&self, direction: Direction) {
        *self.direction_guard() = Some(direction);
    }

    pub fn clear_failures(&self) {
        self.fail_next.store(false, Ordering::SeqCst);
        *self.direction_guard() = None;
    }

    /// Every append sleeps for `latency` before completing.
    pub fn set_append_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(ms, Ordering::SeqCst);
    }

    /// Appends attempted so far, failed ones included.
    pub fn append_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn direction_guard(&self) -> std::sync::MutexGuard<'_, Option<Direction>> {
        self.fail_direction
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn should_fail(&self, message: &Message) -> bool {
        let once = self.fail_next.swap(false, Ordering::SeqCst);
        once || *self.direction_guard() == Some(message.direction)
    }
}

#[async_trait]
impl PluginAdapter for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
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
impl MessageStore for FlakyStore {
    async fn initialize(&self) -> Result<(), ParleyError> {
        self.inner.initialize().await
    }

    async fn append(&self, message: &Message) -> Result<(), ParleyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.should_fail(message) {
            return Err(ParleyError::store(format!(
                "injected failure appending {} message",
                message.direction
            )));
        }
        self.inner.append(message).await
    }

    async fn messages(&self) -> Result<Vec<Message>, ParleyError> {
        self.inner.messages().await
    }

    fn subscribe(&self) -> watch::Receiver<MessageLog> {
        self.inner.subscribe()
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.inner.close().await
    }
}
