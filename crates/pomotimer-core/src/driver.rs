//! Countdown driver.
//!
//! Owns a [`TimerEngine`] and a tokio ticker task that calls `tick()` once
//! per period while the timer runs. State snapshots are published on a
//! `watch` channel; events go out on a `broadcast` channel, so a subscriber
//! sees each event at most once and never sees events from before it
//! subscribed.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::events::Event;
use crate::timer::{PomodoroConfig, TimerEngine, TimerSnapshot};

/// Default countdown cadence.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 16;

/// Drives a [`TimerEngine`] in real time.
///
/// Commands must be issued from inside a tokio runtime, since starting the
/// timer spawns the ticker task.
pub struct TimerDriver {
    shared: Arc<Mutex<Shared>>,
    ticker: Option<JoinHandle<()>>,
    events: broadcast::Sender<Event>,
    state: Arc<watch::Sender<TimerSnapshot>>,
    period: Duration,
}

/// Engine plus the generation of the ticker allowed to drive it. Every
/// command bumps the generation, so a ticker that was aborted mid-tick can
/// no longer touch the engine or the feeds.
struct Shared {
    engine: TimerEngine,
    generation: u64,
}

impl TimerDriver {
    pub fn new(config: PomodoroConfig) -> Self {
        Self::with_period(config, TICK_PERIOD)
    }

    /// Same as [`TimerDriver::new`] with a custom tick period.
    pub fn with_period(config: PomodoroConfig, period: Duration) -> Self {
        let engine = TimerEngine::new(config);
        let (state, _) = watch::channel(engine.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                generation: 0,
            })),
            ticker: None,
            events,
            state: Arc::new(state),
            period,
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.shared).engine.snapshot()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).engine.is_running()
    }

    /// Receive events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Continuous feed of timer snapshots.
    pub fn watch_state(&self) -> watch::Receiver<TimerSnapshot> {
        self.state.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down. When already running only the ticker is
    /// restarted.
    pub fn start(&mut self) -> Option<Event> {
        let (event, generation) = self.command(TimerEngine::start);
        self.ticker = Some(self.spawn_ticker(generation));
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.command(TimerEngine::pause).0
    }

    /// The timer screen's single Start/Pause action.
    pub fn start_pause(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Cancel any pending tick and go back to the first work interval.
    pub fn reset(&mut self) -> Event {
        self.command(TimerEngine::reset).0
    }

    /// Swap in a new config; the timer is reset against it.
    pub fn apply_config(&mut self, config: PomodoroConfig) -> Event {
        self.command(|engine| engine.set_config(config)).0
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Stop the ticker, run `f` against the engine and publish the result.
    /// Returns the new ticker generation alongside `f`'s output.
    fn command<R>(&mut self, f: impl FnOnce(&mut TimerEngine) -> R) -> (R, u64)
    where
        R: Clone + Into<Option<Event>>,
    {
        self.stop_ticker();
        let mut shared = lock(&self.shared);
        shared.generation = shared.generation.wrapping_add(1);
        let out = f(&mut shared.engine);
        publish(&self.state, &self.events, &shared.engine, out.clone().into());
        (out, shared.generation)
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn spawn_ticker(&self, generation: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let period = self.period;

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let snapshot = {
                    let mut shared = lock(&shared);
                    if shared.generation != generation || !shared.engine.is_running() {
                        break;
                    }
                    let event = shared.engine.tick();
                    publish(&state, &events, &shared.engine, event)
                };
                tracing::trace!(
                    phase = %snapshot.phase,
                    seconds_left = snapshot.seconds_left,
                    "tick"
                );
            }
        })
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

/// Push the engine's state and `event` out. Callers hold the engine lock,
/// so feed order matches engine order.
fn publish(
    state: &watch::Sender<TimerSnapshot>,
    events: &broadcast::Sender<Event>,
    engine: &TimerEngine,
    event: Option<Event>,
) -> TimerSnapshot {
    let snapshot = engine.snapshot();
    state.send_replace(snapshot);
    if let Some(event) = event {
        // No receivers is fine.
        let _ = events.send(event);
    }
    snapshot
}

/// The engine holds plain values, so a poisoned lock still guards a
/// consistent state.
fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Phase;
    use tokio::time::sleep;

    fn short_config() -> PomodoroConfig {
        PomodoroConfig {
            work_duration_sec: 3,
            short_break_duration_sec: 2,
            long_break_duration_sec: 4,
            cycles_before_long_break: 2,
        }
    }

    /// Sleep past `secs` ticks, landing between tick deadlines.
    async fn elapse(secs: u64) {
        sleep(Duration::from_millis(secs * 1000 + 500)).await;
    }

    fn drain_phases(rx: &mut broadcast::Receiver<Event>) -> Vec<Phase> {
        let mut phases = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Some(phase) = event.phase_change() {
                phases.push(phase);
            }
        }
        phases
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second() {
        let mut driver = TimerDriver::new(short_config());
        driver.start();
        elapse(1).await;
        assert_eq!(driver.snapshot().seconds_left, 2);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(driver.snapshot().seconds_left, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn phase_change_is_broadcast_and_countdown_continues() {
        let mut driver = TimerDriver::new(short_config());
        let mut rx = driver.subscribe();
        driver.start();
        elapse(3).await;

        assert_eq!(drain_phases(&mut rx), vec![Phase::ShortBreak]);
        let snap = driver.snapshot();
        assert_eq!(snap.phase, Phase::ShortBreak);
        assert_eq!(snap.seconds_left, 2);
        assert!(snap.running);

        elapse(2).await;
        assert_eq!(driver.snapshot().phase, Phase::Work);
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_gets_no_replay() {
        let mut driver = TimerDriver::new(short_config());
        driver.start();
        elapse(3).await;
        let mut rx = driver.subscribe();
        assert!(drain_phases(&mut rx).is_empty());
        elapse(2).await;
        assert_eq!(drain_phases(&mut rx), vec![Phase::Work]);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking() {
        let mut driver = TimerDriver::new(short_config());
        driver.start();
        elapse(1).await;
        driver.pause();
        elapse(5).await;
        let snap = driver.snapshot();
        assert_eq!(snap.seconds_left, 2);
        assert!(!snap.running);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_restarts_ticker_only() {
        let mut driver = TimerDriver::new(short_config());
        assert!(driver.start().is_some());
        elapse(1).await;
        assert!(driver.start().is_none());
        assert!(driver.is_running());
        assert_eq!(driver.snapshot().seconds_left, 2);
        elapse(1).await;
        assert_eq!(driver.snapshot().seconds_left, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_countdown() {
        let mut driver = TimerDriver::new(short_config());
        driver.start();
        elapse(4).await;
        assert_eq!(driver.snapshot().phase, Phase::ShortBreak);

        driver.reset();
        elapse(5).await;
        let snap = driver.snapshot();
        assert_eq!(snap.phase, Phase::Work);
        assert_eq!(snap.cycle_count, 0);
        assert_eq!(snap.seconds_left, 3);
        assert!(!snap.running);
    }

    #[tokio::test(start_paused = true)]
    async fn start_pause_toggles() {
        let mut driver = TimerDriver::new(short_config());
        assert!(matches!(driver.start_pause(), Some(Event::TimerStarted { .. })));
        assert!(matches!(driver.start_pause(), Some(Event::TimerPaused { .. })));
        assert!(!driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn state_feed_follows_ticks() {
        let mut driver = TimerDriver::new(short_config());
        let mut state = driver.watch_state();
        driver.start();
        elapse(1).await;
        assert!(state.has_changed().unwrap());
        let snap = *state.borrow_and_update();
        assert_eq!(snap.seconds_left, 2);
        assert!(snap.running);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn state_feed_settles_on_command_result() {
        let mut driver = TimerDriver::with_period(
            PomodoroConfig {
                work_duration_sec: 1_000,
                ..short_config()
            },
            Duration::from_millis(1),
        );
        let state = driver.watch_state();
        for round in 0..50 {
            driver.start();
            tokio::time::sleep(Duration::from_millis(3)).await;
            if round % 2 == 0 {
                driver.pause();
            } else {
                driver.reset();
            }
            let settled = driver.snapshot();
            tokio::time::sleep(Duration::from_millis(3)).await;
            assert!(!settled.running);
            assert_eq!(*state.borrow(), settled);
            assert_eq!(driver.snapshot(), settled);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restarted_ticker_does_not_double_tick() {
        let mut driver = TimerDriver::new(short_config());
        driver.start();
        sleep(Duration::from_millis(999)).await;
        driver.start();
        driver.start();
        elapse(1).await;
        assert_eq!(driver.snapshot().seconds_left, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_config_resets_against_new_values() {
        let mut driver = TimerDriver::new(PomodoroConfig::default());
        driver.start();
        elapse(2).await;
        driver.apply_config(short_config());
        let snap = driver.snapshot();
        assert_eq!(snap.seconds_left, 3);
        assert_eq!(snap.cycles_before_long_break, 2);
        assert!(!snap.running);
    }
}
