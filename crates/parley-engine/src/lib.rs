// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat engine for Parley.
//!
//! The [`ChatEngine`] is the central coordinator that:
//! - Appends sent messages to a [`MessageStore`](parley_core::MessageStore)
//! - Debounces auto-replies through the [`scheduler`]
//! - Publishes the log as a derived timeline (see [`timeline`])

pub mod clock;
pub mod engine;
pub mod scheduler;
pub mod scramble;
pub mod shutdown;
pub mod timeline;

pub use clock::{SystemClock, TokioClock};
pub use engine::{ChatEngine, EngineEvent, EngineSettings, TimelineSubscription};
pub use scheduler::{FireDecision, ReplyTask, SchedulerPhase, SchedulerState};
pub use scramble::{Scrambler, ShuffleScrambler};
pub use timeline::{transform, TimelineRules};
