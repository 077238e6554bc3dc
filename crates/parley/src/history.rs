// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley history` command implementation.

use std::io::IsTerminal;

use parley_config::model::ParleyConfig;
use parley_core::{MessageStore, ParleyError};
use parley_engine::TimelineRules;

use crate::render;

/// Prints the stored conversation as a timeline and exits.
pub async fn run_history(config: &ParleyConfig, plain: bool) -> Result<(), ParleyError> {
    let store = parley_storage::open_store(&config.storage);
    store.initialize().await?;

    let messages = store.messages().await?;
    let entries = TimelineRules::from_config(&config.timeline).transform(&messages);
    let color = !plain && std::io::stdout().is_terminal();

    if entries.is_empty() {
        println!("no messages yet");
    }
    for line in render::render_from(&entries, 0, color) {
        println!("{line}");
    }

    store.close().await
}
