// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`MessageStore`] trait.

use async_trait::async_trait;
use tokio::sync::{watch, OnceCell};
use tracing::debug;

use parley_config::model::StorageConfig;
use parley_core::types::{HealthStatus, Message, MessageLog};
use parley_core::{MessageStore, ParleyError, PluginAdapter};

use crate::database::Database;
use crate::log::LogPublisher;
use crate::queries;

/// SQLite-backed message store.
///
/// The database is opened lazily by [`MessageStore::initialize`], which also
/// loads the persisted log so subscribers start from the on-disk history.
/// After that, every successful insert is mirrored into the published
/// snapshot; a failed insert leaves the snapshot untouched.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
    log: LogPublisher,
}

impl SqliteStore {
    /// The database connection is not opened until [`MessageStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            log: LogPublisher::new(),
        }
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Store {
            source: "store not initialized -- call initialize() first".into(),
        })
    }

    /// Number of persisted messages.
    pub async fn count(&self) -> Result<i64, ParleyError> {
        queries::messages::count_messages(self.db()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        let existing = queries::messages::list_messages(&db).await?;
        self.db.set(db).map_err(|_| ParleyError::Store {
            source: "store already initialized".into(),
        })?;
        debug!(
            path = %self.config.database_path,
            messages = existing.len(),
            "SQLite store initialized"
        );
        self.log.replace(existing);
        Ok(())
    }

    async fn append(&self, message: &Message) -> Result<(), ParleyError> {
        queries::messages::insert_message(self.db()?, message).await?;
        self.log.insert(message.clone());
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<Message>, ParleyError> {
        queries::messages::list_messages(self.db()?).await
    }

    fn subscribe(&self) -> watch::Receiver<MessageLog> {
        self.log.subscribe()
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
