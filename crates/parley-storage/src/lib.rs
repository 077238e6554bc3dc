// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store backends for Parley.
//!
//! Provides a WAL-mode SQLite store with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, plus a volatile
//! in-memory store. Both publish the ordered log through a `watch` channel.

pub mod database;
mod log;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod sqlite;

use std::sync::Arc;

use parley_config::model::{StorageBackend, StorageConfig};
use parley_core::MessageStore;

pub use database::Database;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Builds the store selected by `config`. Call `initialize` before use.
pub fn open_store(config: &StorageConfig) -> Arc<dyn MessageStore> {
    match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::new(config.clone())),
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
    }
}
