// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a two-party chat timeline with a debounced auto-reply.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod history;
mod render;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_config::model::ParleyConfig;
use parley_core::ParleyError;

/// Parley - a two-party chat timeline with a debounced auto-reply.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Shell,
    /// Print the resolved configuration as TOML.
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
    /// Print the stored conversation.
    History {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Check that the configured store opens and is healthy.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration without printing it.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: ParleyConfig) -> Result<(), ParleyError> {
    match command {
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Config { action: None }) => {
            let rendered = parley_config::render_toml(&config)
                .map_err(|e| ParleyError::Config(e.to_string()))?;
            print!("{rendered}");
            Ok(())
        }
        Some(Commands::Config {
            action: Some(ConfigCommands::Check),
        }) => {
            println!("parley: configuration ok");
            Ok(())
        }
        Some(Commands::History { plain }) => history::run_history(&config, plain).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("parley: use --help for available commands");
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `parley*` crates log at the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let level = log_level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
