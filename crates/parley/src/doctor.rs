// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley doctor` command implementation.
//!
//! Runs diagnostic checks against the configured message store.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use parley_config::model::{ParleyConfig, StorageBackend};
use parley_core::types::HealthStatus;
use parley_core::{MessageStore, ParleyError, PluginAdapter};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `parley doctor` command.
///
/// Returns an error when any check fails so the process exits non-zero.
pub async fn run_doctor(config: &ParleyConfig, plain: bool) -> Result<(), ParleyError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let store = parley_storage::open_store(&config.storage);
    let results = run_checks(config, store.as_ref()).await;
    let _ = store.shutdown().await;

    println!();
    println!("  parley doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Pass => {}
        }
        println!("{}", format_result(result, use_color));
    }
    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    if fail_count > 0 {
        return Err(ParleyError::HealthCheckFailed {
            name: store.name().to_string(),
            source: format!("{fail_count} check(s) failed").into(),
        });
    }
    Ok(())
}

/// Opens `store`, then checks its health and reads the log.
pub async fn run_checks(config: &ParleyConfig, store: &dyn MessageStore) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let start = Instant::now();
    let target = match config.storage.backend {
        StorageBackend::Sqlite => config.storage.database_path.clone(),
        StorageBackend::Memory => "in-memory".to_string(),
    };
    if let Err(e) = store.initialize().await {
        results.push(CheckResult::new(
            "store",
            CheckStatus::Fail,
            format!("cannot open {target}: {e}"),
            start,
        ));
        return results;
    }
    results.push(CheckResult::new(
        "store",
        CheckStatus::Pass,
        format!("{} ({target})", store.name()),
        start,
    ));

    let start = Instant::now();
    results.push(match store.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new("health", CheckStatus::Pass, "healthy", start),
        Ok(status) => CheckResult::new("health", CheckStatus::Warn, status.to_string(), start),
        Err(e) => CheckResult::new("health", CheckStatus::Fail, e.to_string(), start),
    });

    let start = Instant::now();
    results.push(match store.messages().await {
        Ok(messages) => CheckResult::new(
            "messages",
            CheckStatus::Pass,
            format!("{} stored", messages.len()),
            start,
        ),
        Err(e) => CheckResult::new("messages", CheckStatus::Fail, e.to_string(), start),
    });

    results
}

fn format_result(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    let (symbol, message) = match (&result.status, use_color) {
        (CheckStatus::Pass, true) => ("✓".green().to_string(), result.message.clone()),
        (CheckStatus::Warn, true) => ("!".yellow().to_string(), result.message.yellow().to_string()),
        (CheckStatus::Fail, true) => ("✗".red().to_string(), result.message.red().to_string()),
        (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
        (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
        (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
    };
    format!("    {symbol} {:<12} {message} ({duration_ms}ms)", result.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_storage::{InMemoryStore, SqliteStore};

    #[tokio::test]
    async fn memory_store_passes_all_checks() {
        let mut config = ParleyConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let store = InMemoryStore::new();

        let results = run_checks(&config, &store).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == CheckStatus::Pass));
    }

    #[tokio::test]
    async fn sqlite_store_in_temp_dir_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ParleyConfig::default();
        config.storage.database_path = dir.path().join("doctor.db").to_string_lossy().to_string();
        let store = SqliteStore::new(config.storage.clone());

        let results = run_checks(&config, &store).await;
        assert!(results.iter().all(|r| r.status == CheckStatus::Pass), "{results:?}");
        assert_eq!(results[2].message, "0 stored");
    }

    #[tokio::test]
    async fn unopenable_database_fails_store_check() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut config = ParleyConfig::default();
        config.storage.database_path = blocker.join("parley.db").to_string_lossy().to_string();
        let store = SqliteStore::new(config.storage.clone());

        let results = run_checks(&config, &store).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Fail);
    }

    #[test]
    fn plain_format_has_status_tags() {
        let result = CheckResult {
            name: "store".to_string(),
            status: CheckStatus::Fail,
            message: "broken".to_string(),
            duration: Duration::from_millis(3),
        };
        let line = format_result(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("broken (3ms)"));
    }
}
