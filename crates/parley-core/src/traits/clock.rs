// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time source abstraction.

/// Supplies the current time in milliseconds since the Unix epoch.
///
/// Only deltas between readings within one session are compared, so an
/// implementation needs to be monotonic enough for that, nothing more.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}
