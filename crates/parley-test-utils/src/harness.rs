// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine tests.
//!
//! `TestHarness` assembles a [`ChatEngine`] over a fresh store (in-memory by
//! default, or SQLite in a temp directory), a tokio-driven clock and a
//! seeded scrambler. Run tests on a paused runtime and move time with
//! `tokio::time::sleep` / `advance`.

use std::sync::Arc;
use std::time::Duration;

use parley_config::model::{StorageBackend, StorageConfig};
use parley_core::types::{Direction, Message, TimelineEntry};
use parley_core::{MessageStore, ParleyError};
use parley_engine::{ChatEngine, EngineSettings, ShuffleScrambler, TimelineRules, TokioClock};
use parley_storage::{InMemoryStore, SqliteStore};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backend: StorageBackend,
    settings: EngineSettings,
    rules: TimelineRules,
    seed: u64,
    origin_millis: i64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: StorageBackend::Memory,
            settings: EngineSettings::default(),
            rules: TimelineRules::default(),
            seed: 0x5eed,
            origin_millis: 0,
        }
    }

    /// Persist to a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = StorageBackend::Sqlite;
        self
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.settings.quiet_period = quiet_period;
        self
    }

    pub fn with_auto_reply(mut self, enabled: bool) -> Self {
        self.settings.auto_reply = enabled;
        self
    }

    pub fn with_rules(mut self, rules: TimelineRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Clock reading at harness creation.
    pub fn starting_at(mut self, origin_millis: i64) -> Self {
        self.origin_millis = origin_millis;
        self
    }

    /// Build the harness and initialize its store.
    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let mut temp_dir = None;
        let store: Arc<dyn MessageStore> = match self.backend {
            StorageBackend::Memory => Arc::new(InMemoryStore::new()),
            StorageBackend::Sqlite => {
                let dir = tempfile::TempDir::new().map_err(ParleyError::store)?;
                let config = StorageConfig {
                    backend: StorageBackend::Sqlite,
                    database_path: dir.path().join("test.db").to_string_lossy().to_string(),
                    wal_mode: true,
                };
                temp_dir = Some(dir);
                Arc::new(SqliteStore::new(config))
            }
        };
        store.initialize().await?;

        let engine = ChatEngine::new(
            Arc::clone(&store),
            Arc::new(TokioClock::starting_at(self.origin_millis)),
            Arc::new(ShuffleScrambler::seeded(self.seed)),
            self.rules,
            self.settings,
        );

        Ok(TestHarness {
            engine,
            store,
            _temp_dir: temp_dir,
        })
    }
}

/// A chat engine over a throwaway store.
pub struct TestHarness {
    pub engine: ChatEngine,
    pub store: Arc<dyn MessageStore>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// In-memory harness with default settings.
    pub async fn new() -> Result<Self, ParleyError> {
        Self::builder().build().await
    }

    pub async fn send(&self, content: &str) -> Result<Message, ParleyError> {
        self.engine.send(content).await
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.store.messages().await.unwrap_or_default()
    }

    /// Stored messages of the other party.
    pub async fn replies(&self) -> Vec<Message> {
        self.messages()
            .await
            .into_iter()
            .filter(|m| m.direction == Direction::Received)
            .collect()
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.engine.timeline()
    }

    /// Lets virtual time pass.
    pub async fn wait_ms(&self, millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
