// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that front ends monitor. A pending auto-reply can
//! be given time to land before the store is closed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::ChatEngine;
use crate::scheduler::SchedulerPhase;

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    token_clone.cancel();
                    return;
                }
            };

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
                _ = token_clone.cancelled() => {}
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = ctrl_c => info!("received Ctrl+C, initiating shutdown"),
                _ = token_clone.cancelled() => {}
            }
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for the engine's scheduler to go idle.
///
/// Returns `true` when no reply is pending anymore.
pub async fn drain_pending_reply(engine: &ChatEngine, timeout: Duration) -> bool {
    let mut phase = engine.watch_reply_state();
    if *phase.borrow_and_update() == SchedulerPhase::Idle {
        debug!("no pending reply to drain");
        return true;
    }

    info!("waiting for pending reply");
    let idle = tokio::time::timeout(
        timeout,
        phase.wait_for(|p| *p == SchedulerPhase::Idle),
    )
    .await;

    match idle {
        Ok(Ok(_)) => {
            info!("pending reply settled");
            true
        }
        _ => {
            warn!("timeout reached, pending reply dropped");
            false
        }
    }
}
