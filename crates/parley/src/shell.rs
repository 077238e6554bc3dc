// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Every line is sent through the chat engine; a background observer prints
//! timeline entries as they land, auto-replies included.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use parley_config::model::ParleyConfig;
use parley_core::{MessageStore, ParleyError, PluginAdapter};
use parley_engine::shutdown::{drain_pending_reply, install_signal_handler};
use parley_engine::{ChatEngine, SystemClock};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::render;

/// Grace period on exit for a pending reply, on top of the quiet period.
const DRAIN_SLACK: Duration = Duration::from_millis(500);

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Skip,
    /// Sent exactly as typed; only commands are matched after trimming.
    Send(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "" => Input::Skip,
        _ => Input::Send(line),
    }
}

/// Runs the `parley shell` interactive REPL.
pub async fn run_shell(config: ParleyConfig) -> Result<(), ParleyError> {
    let store: Arc<dyn MessageStore> = parley_storage::open_store(&config.storage);
    store.initialize().await?;
    info!(backend = store.name(), "store ready");

    let engine = ChatEngine::from_config(&config, Arc::clone(&store), Arc::new(SystemClock));
    let color = std::io::stdout().is_terminal();

    println!("{}", "parley shell".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    // History is printed up front; the observer only prints what arrives later.
    let history = engine.timeline();
    for line in render::render_from(&history, 0, color) {
        println!("{line}");
    }
    let mut printed = history.len();
    let observer = engine.observe_timeline(move |entries| {
        if entries.len() > printed {
            for line in render::render_from(&entries, printed, color) {
                println!("{line}");
            }
            printed = entries.len();
        }
    });

    let token = install_signal_handler();
    let mut rl = DefaultEditor::new()
        .map_err(|e| ParleyError::Internal(format!("failed to initialize readline: {e}")))?;
    let prompt = format!("{}> ", "parley".green());

    loop {
        let prompt = prompt.clone();
        let read = tokio::task::spawn_blocking(move || {
            let line = rl.readline(&prompt);
            (line, rl)
        });

        let (line, editor) = tokio::select! {
            joined = read => joined
                .map_err(|e| ParleyError::Internal(format!("readline task failed: {e}")))?,
            _ = token.cancelled() => break,
        };
        rl = editor;

        match line {
            Ok(line) => match parse_input(&line) {
                Input::Quit => break,
                Input::Skip => continue,
                Input::Send(content) => {
                    let _ = rl.add_history_entry(content);
                    if let Err(e) = engine.send(content).await {
                        eprintln!("{}: {e}", "error".red());
                    }
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    let grace = engine.settings().quiet_period + DRAIN_SLACK;
    drain_pending_reply(&engine, grace).await;
    observer.abort();
    token.cancel();

    store.close().await?;
    debug!("shell exited");
    Ok(())
}
