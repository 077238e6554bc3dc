// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debounce bookkeeping for auto-replies.
//!
//! Every send arms a new [`ReplyTask`] and bumps the generation. Tasks are
//! never cancelled: when a task's timer runs out it asks
//! [`SchedulerState::evaluate`] whether it is still the authoritative one.
//! A task emits only if no later send has happened (generation check) and
//! the quiet period has fully elapsed since the most recent send.
//!
//! States: `Idle` (nothing outstanding) and `Pending` (a task armed for the
//! latest send). The state is plain data; [`ChatEngine`](crate::ChatEngine)
//! serializes access behind an async mutex.

use std::fmt;

/// Externally visible phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Pending {
        generation: u64,
        deadline_millis: i64,
    },
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerPhase::Idle => write!(f, "idle"),
            SchedulerPhase::Pending {
                generation,
                deadline_millis,
            } => write!(f, "pending (generation {generation}, due at {deadline_millis})"),
        }
    }
}

/// A delayed reply armed by one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTask {
    pub generation: u64,
    /// Content of the send that armed this task.
    pub source: String,
    pub deadline_millis: i64,
}

/// Outcome of a task's timer running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Write the reply.
    Emit,
    /// A later send owns the reply; do nothing.
    Superseded,
}

/// Generation counter, last send time and the outstanding task.
#[derive(Debug, Default)]
pub struct SchedulerState {
    generation: u64,
    last_sent_at_millis: Option<i64>,
    pending: Option<ReplyTask>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a send at `now` and returns the task that owns its reply.
    pub fn arm(&mut self, source: &str, now: i64, quiet_ms: i64) -> ReplyTask {
        self.generation = self.generation.wrapping_add(1);
        self.last_sent_at_millis = Some(now);
        let task = ReplyTask {
            generation: self.generation,
            source: source.to_owned(),
            deadline_millis: now.saturating_add(quiet_ms),
        };
        self.pending = Some(task.clone());
        task
    }

    /// Decides whether `task` may emit at `now`.
    pub fn evaluate(&self, task: &ReplyTask, now: i64, quiet_ms: i64) -> FireDecision {
        if task.generation != self.generation {
            return FireDecision::Superseded;
        }
        match self.last_sent_at_millis {
            Some(last) if now.saturating_sub(last) >= quiet_ms => FireDecision::Emit,
            _ => FireDecision::Superseded,
        }
    }

    /// Returns to `Idle` if `generation` is the outstanding task.
    pub fn settle(&mut self, generation: u64) {
        if self
            .pending
            .as_ref()
            .is_some_and(|task| task.generation == generation)
        {
            self.pending = None;
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        match &self.pending {
            None => SchedulerPhase::Idle,
            Some(task) => SchedulerPhase::Pending {
                generation: task.generation,
                deadline_millis: task.deadline_millis,
            },
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_sent_at_millis(&self) -> Option<i64> {
        self.last_sent_at_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: i64 = 5_000;

    #[test]
    fn starts_idle() {
        let state = SchedulerState::new();
        assert_eq!(state.phase(), SchedulerPhase::Idle);
        assert_eq!(state.generation(), 0);
        assert_eq!(state.last_sent_at_millis(), None);
    }

    #[test]
    fn arm_moves_to_pending_with_deadline() {
        let mut state = SchedulerState::new();
        let task = state.arm("hi", 1_000, QUIET);
        assert_eq!(task.generation, 1);
        assert_eq!(task.deadline_millis, 6_000);
        assert_eq!(
            state.phase(),
            SchedulerPhase::Pending {
                generation: 1,
                deadline_millis: 6_000
            }
        );
        assert_eq!(state.last_sent_at_millis(), Some(1_000));
    }

    #[test]
    fn elapsed_boundary_is_inclusive() {
        let mut state = SchedulerState::new();
        let task = state.arm("hi", 0, QUIET);
        assert_eq!(state.evaluate(&task, 4_999, QUIET), FireDecision::Superseded);
        assert_eq!(state.evaluate(&task, 5_000, QUIET), FireDecision::Emit);
    }

    #[test]
    fn later_send_supersedes_earlier_task() {
        let mut state = SchedulerState::new();
        let first = state.arm("A", 0, QUIET);
        let second = state.arm("B", 3_000, QUIET);

        assert_eq!(state.evaluate(&first, 5_000, QUIET), FireDecision::Superseded);
        assert_eq!(state.evaluate(&second, 8_000, QUIET), FireDecision::Emit);
    }

    #[test]
    fn late_stale_task_never_emits() {
        let mut state = SchedulerState::new();
        let first = state.arm("A", 0, QUIET);
        state.arm("B", 1_000, QUIET);

        // Far past both deadlines, only the newest generation may emit.
        assert_eq!(state.evaluate(&first, 60_000, QUIET), FireDecision::Superseded);
    }

    #[test]
    fn late_latest_task_still_emits() {
        let mut state = SchedulerState::new();
        let task = state.arm("A", 0, QUIET);
        assert_eq!(
            state.evaluate(&task, task.deadline_millis + 55_000, QUIET),
            FireDecision::Emit
        );
    }

    #[test]
    fn settle_ignores_stale_generations() {
        let mut state = SchedulerState::new();
        let first = state.arm("A", 0, QUIET);
        let second = state.arm("B", 100, QUIET);

        state.settle(first.generation);
        assert!(matches!(state.phase(), SchedulerPhase::Pending { generation: 2, .. }));

        state.settle(second.generation);
        assert_eq!(state.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn phase_display() {
        assert_eq!(SchedulerPhase::Idle.to_string(), "idle");
        let pending = SchedulerPhase::Pending {
            generation: 3,
            deadline_millis: 9_000,
        };
        assert_eq!(pending.to_string(), "pending (generation 3, due at 9000)");
    }
}
