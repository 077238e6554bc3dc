// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat engine: store, timeline and auto-reply scheduler wired together.

use std::sync::Arc;
use std::time::Duration;

use parley_config::model::{EngineConfig, ParleyConfig};
use parley_core::types::{Message, MessageLog, TimelineEntry};
use parley_core::{Clock, MessageStore, ParleyError};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scheduler::{FireDecision, ReplyTask, SchedulerPhase, SchedulerState};
use crate::scramble::{Scrambler, ShuffleScrambler};
use crate::timeline::TimelineRules;

const EVENT_CAPACITY: usize = 64;

/// Scheduler notifications published on [`ChatEngine::events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A send armed a reply due at `deadline_millis`.
    ReplyScheduled { generation: u64, deadline_millis: i64 },
    /// A reply was written to the store.
    ReplyDelivered { generation: u64, message: Message },
    /// A task woke up after a later send took over.
    ReplySuperseded { generation: u64 },
    /// Writing the reply failed. It is not retried.
    ReplyFailed { generation: u64, error: String },
}

/// Scheduler knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub quiet_period: Duration,
    pub auto_reply: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(5_000),
            auto_reply: true,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            quiet_period: Duration::from_millis(config.quiet_period_ms),
            auto_reply: config.auto_reply,
        }
    }

    fn quiet_ms(&self) -> i64 {
        i64::try_from(self.quiet_period.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Two-party chat over a [`MessageStore`].
///
/// `send` appends a Sent message and arms a reply; the reply is a scrambled
/// copy of the most recent send, written once a full quiet period passes
/// without another send. Observers receive the store's log already run
/// through the timeline rules.
///
/// Cloning is cheap and every clone drives the same engine.
#[derive(Clone)]
pub struct ChatEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    scrambler: Arc<dyn Scrambler>,
    rules: TimelineRules,
    settings: EngineSettings,
    /// Held across evaluation and the store write, for sends and fires alike.
    scheduler: Mutex<SchedulerState>,
    phase_tx: watch::Sender<SchedulerPhase>,
    events_tx: broadcast::Sender<EngineEvent>,
}

impl ChatEngine {
    pub fn new(
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        scrambler: Arc<dyn Scrambler>,
        rules: TimelineRules,
        settings: EngineSettings,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SchedulerPhase::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                scrambler,
                rules,
                settings,
                scheduler: Mutex::new(SchedulerState::new()),
                phase_tx,
                events_tx,
            }),
        }
    }

    /// Builds an engine from the `[engine]` and `[timeline]` sections.
    pub fn from_config(
        config: &ParleyConfig,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            store,
            clock,
            Arc::new(ShuffleScrambler::from_seed(config.engine.scramble_seed)),
            TimelineRules::from_config(&config.timeline),
            EngineSettings::from_config(&config.engine),
        )
    }

    /// Appends `content` as a Sent message and arms the auto-reply.
    ///
    /// Blank content is rejected with [`ParleyError::InvalidInput`]. A store
    /// failure is returned as-is and leaves the scheduler untouched.
    pub async fn send(&self, content: &str) -> Result<Message, ParleyError> {
        if content.trim().is_empty() {
            return Err(ParleyError::InvalidInput(
                "message content is blank".to_string(),
            ));
        }

        let inner = &self.inner;
        let mut state = inner.scheduler.lock().await;
        let now = inner.clock.now_millis();
        // The quiet period runs from the send, not from when the write lands.
        let started = tokio::time::Instant::now();
        let message = Message::sent(content, now);
        inner.store.append(&message).await?;
        debug!(id = %message.id, sent_at = now, "message sent");

        if !inner.settings.auto_reply {
            return Ok(message);
        }

        let task = state.arm(content, now, inner.settings.quiet_ms());
        inner.publish_phase(&state);
        drop(state);

        debug!(
            generation = task.generation,
            deadline = task.deadline_millis,
            "reply scheduled"
        );
        inner.emit(EngineEvent::ReplyScheduled {
            generation: task.generation,
            deadline_millis: task.deadline_millis,
        });
        self.spawn_fire(task, started + inner.settings.quiet_period);
        Ok(message)
    }

    fn spawn_fire(&self, task: ReplyTask, due: tokio::time::Instant) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep_until(due).await;
            inner.fire(task).await;
        });
    }

    /// Current scheduler phase.
    pub fn reply_state(&self) -> SchedulerPhase {
        *self.inner.phase_tx.borrow()
    }

    /// Watches scheduler phase changes.
    pub fn watch_reply_state(&self) -> watch::Receiver<SchedulerPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Scheduler notifications from now on.
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events_tx.subscribe()
    }

    /// The timeline for the store's current log.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let log = self.inner.store.subscribe().borrow().clone();
        self.inner.rules.transform(&log)
    }

    /// Pull-style timeline subscription.
    pub fn subscribe_timeline(&self) -> TimelineSubscription {
        TimelineSubscription {
            rx: self.inner.store.subscribe(),
            rules: self.inner.rules,
        }
    }

    /// Calls `on_change` with the current timeline, then after every store
    /// change, until the store goes away or the handle is aborted.
    ///
    /// Notifications coalesce: a slow callback only sees the latest log.
    pub fn observe_timeline<F>(&self, mut on_change: F) -> JoinHandle<()>
    where
        F: FnMut(Vec<TimelineEntry>) + Send + 'static,
    {
        let mut subscription = self.subscribe_timeline();
        tokio::spawn(async move {
            on_change(subscription.current());
            while let Some(entries) = subscription.changed().await {
                on_change(entries);
            }
            debug!("timeline observer stopped");
        })
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.inner.store
    }

    pub fn rules(&self) -> &TimelineRules {
        &self.inner.rules
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }
}

impl Inner {
    async fn fire(&self, task: ReplyTask) {
        let mut state = self.scheduler.lock().await;
        let now = self.clock.now_millis();

        match state.evaluate(&task, now, self.settings.quiet_ms()) {
            FireDecision::Superseded => {
                state.settle(task.generation);
                self.publish_phase(&state);
                debug!(
                    generation = task.generation,
                    current = state.generation(),
                    "reply superseded"
                );
                self.emit(EngineEvent::ReplySuperseded {
                    generation: task.generation,
                });
            }
            FireDecision::Emit => {
                let reply = Message::received(self.scrambler.scramble(&task.source), now);
                state.settle(task.generation);

                let written = self.store.append(&reply).await;
                self.publish_phase(&state);
                match written {
                    Ok(()) => {
                        info!(generation = task.generation, id = %reply.id, "reply delivered");
                        self.emit(EngineEvent::ReplyDelivered {
                            generation: task.generation,
                            message: reply,
                        });
                    }
                    Err(e) => {
                        warn!(generation = task.generation, error = %e, "reply write failed");
                        self.emit(EngineEvent::ReplyFailed {
                            generation: task.generation,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    fn publish_phase(&self, state: &SchedulerState) {
        self.phase_tx.send_replace(state.phase());
    }

    fn emit(&self, event: EngineEvent) {
        // No receivers is fine.
        let _ = self.events_tx.send(event);
    }
}

/// Store subscription that yields transformed timelines.
pub struct TimelineSubscription {
    rx: watch::Receiver<MessageLog>,
    rules: TimelineRules,
}

impl TimelineSubscription {
    /// Timeline for the latest log, marking it seen.
    pub fn current(&mut self) -> Vec<TimelineEntry> {
        let log = self.rx.borrow_and_update().clone();
        self.rules.transform(&log)
    }

    /// Waits for the next change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Vec<TimelineEntry>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use parley_core::types::Direction;
    use parley_storage::InMemoryStore;
    use parley_test_utils::{FlakyStore, ManualClock};
    use tokio::sync::broadcast::error::TryRecvError;
    use tracing_test::traced_test;

    fn engine_with(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> ChatEngine {
        ChatEngine::new(
            store,
            clock,
            Arc::new(ShuffleScrambler::seeded(11)),
            TimelineRules::default(),
            EngineSettings::default(),
        )
    }

    fn paused_engine() -> (ChatEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = engine_with(store.clone(), Arc::new(TokioClock::starting_at(0)));
        (engine, store)
    }

    async fn received(store: &dyn MessageStore) -> Vec<Message> {
        store
            .messages()
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.direction == Direction::Received)
            .collect()
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn sorted(s: &str) -> Vec<char> {
        let mut chars: Vec<char> = s.chars().collect();
        chars.sort_unstable();
        chars
    }

    #[tokio::test(start_paused = true)]
    async fn single_send_gets_one_scrambled_reply() {
        let (engine, store) = paused_engine();
        engine.send("Hello World").await.unwrap();

        sleep_ms(5_001).await;
        let replies = received(store.as_ref()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content.chars().count(), 11);
        assert_eq!(sorted(&replies[0].content), sorted("Hello World"));
        assert_eq!(replies[0].sent_at_millis, 5_000);
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_replies_once_to_the_last_send() {
        let (engine, store) = paused_engine();
        engine.send("A").await.unwrap();
        sleep_ms(3_000).await;
        engine.send("B").await.unwrap();

        sleep_ms(5_001).await;
        let replies = received(store.as_ref()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, "B");
        assert_eq!(replies[0].sent_at_millis, 8_000);
    }

    #[tokio::test(start_paused = true)]
    async fn second_send_just_inside_quiet_period_defers_reply() {
        let (engine, store) = paused_engine();
        engine.send("X").await.unwrap();
        sleep_ms(4_999).await;
        engine.send("Y").await.unwrap();

        sleep_ms(4_999).await;
        assert!(received(store.as_ref()).await.is_empty());

        sleep_ms(2).await;
        let replies = received(store.as_ref()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, "Y");
    }

    #[tokio::test(start_paused = true)]
    async fn events_trace_a_superseded_burst() {
        let (engine, _store) = paused_engine();
        let mut events = engine.events();

        engine.send("one").await.unwrap();
        sleep_ms(1_000).await;
        engine.send("two").await.unwrap();
        sleep_ms(6_000).await;

        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::ReplyScheduled {
                generation: 1,
                deadline_millis: 5_000
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::ReplyScheduled {
                generation: 2,
                deadline_millis: 6_000
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::ReplySuperseded { generation: 1 }
        );
        match events.recv().await.unwrap() {
            EngineEvent::ReplyDelivered { generation, message } => {
                assert_eq!(generation, 2);
                assert_eq!(sorted(&message.content), sorted("two"));
            }
            other => panic!("expected delivery, got {other:?}"),
        }
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn reply_state_tracks_pending_deadline() {
        let (engine, _store) = paused_engine();
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);

        engine.send("hey").await.unwrap();
        assert_eq!(
            engine.reply_state(),
            SchedulerPhase::Pending {
                generation: 1,
                deadline_millis: 5_000
            }
        );

        sleep_ms(5_001).await;
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_content_is_rejected() {
        let (engine, store) = paused_engine();
        for blank in ["", "   ", "\n\t"] {
            let err = engine.send(blank).await.unwrap_err();
            assert!(matches!(err, ParleyError::InvalidInput(_)));
        }
        sleep_ms(10_000).await;
        assert!(store.messages().await.unwrap().is_empty());
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_send_write_does_not_push_back_the_reply() {
        let store = Arc::new(FlakyStore::new());
        store.set_append_latency(Duration::from_millis(1_000));
        let engine = engine_with(store.clone(), Arc::new(TokioClock::starting_at(0)));

        engine.send("slow disk").await.unwrap();
        assert!(matches!(
            engine.reply_state(),
            SchedulerPhase::Pending { deadline_millis: 5_000, .. }
        ));

        // The reply fires at the deadline; its own write then takes another second.
        sleep_ms(5_100).await;
        let replies = received(store.as_ref()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].sent_at_millis, 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn late_fire_for_the_latest_send_still_replies() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let engine = engine_with(store.clone(), clock.clone());

        let task = engine.inner.scheduler.lock().await.arm("late one", 0, 5_000);
        // The process slept well past the deadline before the task ran.
        clock.set(60_000);
        engine.inner.fire(task).await;

        let replies = received(store.as_ref()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].sent_at_millis, 60_000);
        assert_eq!(sorted(&replies[0].content), sorted("late one"));
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_reply_can_be_disabled() {
        let store = Arc::new(InMemoryStore::new());
        let engine = ChatEngine::new(
            store.clone(),
            Arc::new(TokioClock::starting_at(0)),
            Arc::new(ShuffleScrambler::seeded(1)),
            TimelineRules::default(),
            EngineSettings {
                auto_reply: false,
                ..EngineSettings::default()
            },
        );
        engine.send("quiet please").await.unwrap();
        sleep_ms(60_000).await;
        assert_eq!(store.messages().await.unwrap().len(), 1);
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_send_write_schedules_nothing() {
        let store = Arc::new(FlakyStore::new());
        let engine = engine_with(store.clone(), Arc::new(TokioClock::starting_at(0)));
        let mut events = engine.events();

        store.fail_next_append();
        let err = engine.send("lost").await.unwrap_err();
        assert!(err.is_store());
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);

        sleep_ms(10_000).await;
        assert!(store.messages().await.unwrap().is_empty());
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reply_write_is_reported_and_not_retried() {
        let store = Arc::new(FlakyStore::new());
        store.fail_direction(Direction::Received);
        let engine = engine_with(store.clone(), Arc::new(TokioClock::starting_at(0)));
        let mut events = engine.events();

        engine.send("hello").await.unwrap();
        sleep_ms(5_001).await;

        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::ReplyScheduled { generation: 1, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::ReplyFailed { generation: 1, .. }
        ));
        assert_eq!(engine.reply_state(), SchedulerPhase::Idle);

        sleep_ms(30_000).await;
        assert_eq!(store.messages().await.unwrap().len(), 1);
        assert_eq!(store.append_attempts(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_reply_write_logs_a_warning() {
        let store = Arc::new(FlakyStore::new());
        store.fail_direction(Direction::Received);
        let clock = Arc::new(ManualClock::new(0));
        let engine = engine_with(store, clock.clone());

        let task = engine.inner.scheduler.lock().await.arm("hello", 0, 5_000);
        clock.set(5_000);
        engine.inner.fire(task).await;

        assert!(logs_contain("reply write failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn superseded_fire_writes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let engine = engine_with(store.clone(), clock.clone());

        let stale = {
            let mut state = engine.inner.scheduler.lock().await;
            let stale = state.arm("first", 0, 5_000);
            state.arm("second", 1_000, 5_000);
            stale
        };
        clock.set(5_000);
        engine.inner.fire(stale).await;

        assert!(store.messages().await.unwrap().is_empty());
        assert!(logs_contain("reply superseded"));
        assert!(matches!(
            engine.reply_state(),
            SchedulerPhase::Pending { generation: 2, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timeline_subscription_sees_sends_and_replies() {
        let (engine, _store) = paused_engine();
        let mut timeline = engine.subscribe_timeline();
        assert!(timeline.current().is_empty());

        engine.send("ping").await.unwrap();
        let entries = timeline.changed().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].timestamp_label.is_some());
        assert!(!entries[0].tighten_spacing);

        let entries = timeline.changed().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message.direction, Direction::Received);
        assert!(!entries[1].tighten_spacing, "direction changed");
        assert!(entries[1].timestamp_label.is_none());
        assert_eq!(engine.timeline(), entries);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_receives_initial_and_updated_timelines() {
        let (engine, _store) = paused_engine();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = engine.observe_timeline(move |entries| {
            sink.lock().unwrap().push(entries.len());
        });

        tokio::task::yield_now().await;
        engine.send("a").await.unwrap();
        sleep_ms(100).await;
        engine.send("b").await.unwrap();
        sleep_ms(5_100).await;

        let lengths = seen.lock().unwrap().clone();
        assert_eq!(lengths.first(), Some(&0));
        assert_eq!(lengths.last(), Some(&3));
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        handle.abort();
    }
}
