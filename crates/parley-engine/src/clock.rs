// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock implementations backed by the system and by tokio's timer.

use parley_core::Clock;
use tokio::time::Instant;

/// Wall clock in Unix milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock derived from [`tokio::time::Instant`].
///
/// Reads follow tokio's clock, so under a paused runtime they move only with
/// `tokio::time::advance` or auto-advance, in step with the scheduler's timers.
/// This is the clock the engine should use whenever reply timers and message
/// timestamps must agree.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    origin_millis: i64,
}

impl TokioClock {
    /// Anchors the tokio instant to the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(chrono::Utc::now().timestamp_millis())
    }

    /// Anchors the tokio instant to `origin_millis`.
    pub fn starting_at(origin_millis: i64) -> Self {
        Self {
            origin: Instant::now(),
            origin_millis,
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.origin_millis.saturating_add(elapsed)
    }
}
