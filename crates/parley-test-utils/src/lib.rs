// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! # Components
//!
//! - [`ManualClock`] - Clock moved by hand
//! - [`FlakyStore`] - In-memory store with injectable append failures
//! - [`TestHarness`] - Chat engine over a throwaway store

pub mod clock;
pub mod flaky_store;
pub mod harness;

pub use clock::ManualClock;
pub use flaky_store::FlakyStore;
pub use harness::{TestHarness, TestHarnessBuilder};
