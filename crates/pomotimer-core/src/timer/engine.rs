//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not own a
//! clock: the caller (normally [`crate::driver::TimerDriver`]) calls
//! `tick()` once per second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> LongBreak -> Work
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(PomodoroConfig::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::PhaseChanged) when an interval ends
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::PomodoroConfig;
use super::phase::{advance, Phase};
use crate::events::Event;

/// Point-in-time view of the timer, rendered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub seconds_left: u64,
    /// Duration of the current interval.
    pub total_sec: u64,
    /// Work intervals completed since the last long break.
    pub cycle_count: u32,
    pub cycles_before_long_break: u32,
    pub running: bool,
    /// 0.0 .. 1.0 elapsed fraction of the current interval.
    pub progress: f64,
}

impl TimerSnapshot {
    /// Work intervals left before the next long break.
    pub fn cycles_until_long_break(&self) -> u32 {
        self.cycles_before_long_break.saturating_sub(self.cycle_count)
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    config: PomodoroConfig,
    phase: Phase,
    cycle_count: u32,
    seconds_left: u64,
    /// Duration the current interval started with.
    interval_sec: u64,
    running: bool,
}

impl TimerEngine {
    /// Create a new engine in the work phase, not running.
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            phase: Phase::Work,
            cycle_count: 0,
            seconds_left: config.work_duration_sec,
            interval_sec: config.work_duration_sec,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        if self.interval_sec == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_left as f64 / self.interval_sec as f64)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            seconds_left: self.seconds_left,
            total_sec: self.interval_sec,
            cycle_count: self.cycle_count,
            cycles_before_long_break: self.config.cycles_before_long_break,
            running: self.running,
            progress: self.progress(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or continue counting down. Returns `None` if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    /// Stop counting down, keeping phase and remaining time.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    /// Start when stopped, pause when running.
    pub fn start_pause(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to the first work interval with no cycles counted.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.phase = Phase::Work;
        self.cycle_count = 0;
        self.interval_sec = self.config.work_duration_sec;
        self.seconds_left = self.interval_sec;
        Event::TimerReset { at: Utc::now() }
    }

    /// Replace the config wholesale and reset against it.
    pub fn set_config(&mut self, config: PomodoroConfig) -> Event {
        self.config = config;
        self.reset();
        Event::ConfigApplied {
            work_duration_sec: config.work_duration_sec,
            short_break_duration_sec: config.short_break_duration_sec,
            long_break_duration_sec: config.long_break_duration_sec,
            cycles_before_long_break: config.cycles_before_long_break,
            at: Utc::now(),
        }
    }

    /// Count down one second. Returns `Some(Event::PhaseChanged)` when the
    /// interval runs out; the next interval starts immediately.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left > 0 {
            return None;
        }
        Some(self.finish_interval())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_interval(&mut self) -> Event {
        let previous = self.phase;
        let (phase, cycle_count) = advance(previous, self.cycle_count, &self.config);
        self.phase = phase;
        self.cycle_count = cycle_count;
        self.interval_sec = self.config.duration_for(phase);
        self.seconds_left = self.interval_sec;
        tracing::info!(
            from = %previous,
            to = %phase,
            cycle_count,
            "interval finished"
        );
        Event::PhaseChanged {
            previous,
            phase,
            cycle_count,
            duration_secs: self.interval_sec,
            at: Utc::now(),
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> PomodoroConfig {
        PomodoroConfig {
            work_duration_sec: 3,
            short_break_duration_sec: 2,
            long_break_duration_sec: 4,
            cycles_before_long_break: 2,
        }
    }

    fn run_ticks(engine: &mut TimerEngine, n: usize) -> Vec<Event> {
        (0..n).filter_map(|_| engine.tick()).collect()
    }

    #[test]
    fn new_engine_is_idle_work() {
        let engine = TimerEngine::default();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Work);
        assert_eq!(snap.seconds_left, 25 * 60);
        assert_eq!(snap.cycle_count, 0);
        assert!(!snap.running);
        assert_eq!(snap.progress, 0.0);
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = TimerEngine::default();
        assert!(matches!(engine.start_pause(), Some(Event::TimerStarted { .. })));
        assert!(engine.is_running());
        assert!(engine.start().is_none());
        assert!(matches!(engine.start_pause(), Some(Event::TimerPaused { .. })));
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());
    }

    #[test]
    fn tick_is_ignored_while_paused() {
        let mut engine = TimerEngine::new(short_config());
        assert!(engine.tick().is_none());
        assert_eq!(engine.seconds_left(), 3);
    }

    #[test]
    fn tick_counts_down_and_updates_progress() {
        let mut engine = TimerEngine::new(PomodoroConfig {
            work_duration_sec: 4,
            ..short_config()
        });
        engine.start();
        engine.tick();
        assert_eq!(engine.seconds_left(), 3);
        assert!((engine.progress() - 0.25).abs() < f64::EPSILON);
        engine.tick();
        assert!((engine.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn interval_end_advances_and_keeps_running() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        let events = run_ticks(&mut engine, 3);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::PhaseChanged {
                previous,
                phase,
                cycle_count,
                duration_secs,
                ..
            } => {
                assert_eq!(*previous, Phase::Work);
                assert_eq!(*phase, Phase::ShortBreak);
                assert_eq!(*cycle_count, 1);
                assert_eq!(*duration_secs, 2);
            }
            other => panic!("Expected PhaseChanged, got {other:?}"),
        }
        assert!(engine.is_running());
        assert_eq!(engine.seconds_left(), 2);
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn full_cycle_reaches_long_break_then_work() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        // work(3) short(2) work(3) -> long break
        let phases: Vec<Phase> = run_ticks(&mut engine, 8)
            .iter()
            .filter_map(Event::phase_change)
            .collect();
        assert_eq!(phases, vec![Phase::ShortBreak, Phase::Work, Phase::LongBreak]);
        assert_eq!(engine.cycle_count(), 1);
        assert_eq!(engine.seconds_left(), 4);

        let phases: Vec<Phase> = run_ticks(&mut engine, 4)
            .iter()
            .filter_map(Event::phase_change)
            .collect();
        assert_eq!(phases, vec![Phase::Work]);
        assert_eq!(engine.cycle_count(), 1);
    }

    #[test]
    fn progress_is_monotonic_within_interval_and_resets_on_change() {
        let mut engine = TimerEngine::new(PomodoroConfig {
            work_duration_sec: 5,
            ..short_config()
        });
        engine.start();
        let mut last = engine.progress();
        for _ in 0..4 {
            assert!(engine.tick().is_none());
            assert!(engine.progress() >= last);
            last = engine.progress();
        }
        assert!(engine.tick().is_some());
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        run_ticks(&mut engine, 4);
        assert_eq!(engine.phase(), Phase::ShortBreak);

        let event = engine.reset();
        assert!(matches!(event, Event::TimerReset { .. }));
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Work);
        assert_eq!(snap.cycle_count, 0);
        assert_eq!(snap.seconds_left, 3);
        assert!(!snap.running);
        assert_eq!(snap.progress, 0.0);
    }

    #[test]
    fn set_config_replaces_and_resets() {
        let mut engine = TimerEngine::default();
        engine.start();
        engine.tick();
        engine.set_config(short_config());
        let snap = engine.snapshot();
        assert_eq!(snap.total_sec, 3);
        assert_eq!(snap.cycles_before_long_break, 2);
        assert_eq!(engine.seconds_left(), 3);
        assert!(!engine.is_running());
    }

    #[test]
    fn zero_duration_does_not_divide_by_zero() {
        let mut engine = TimerEngine::new(PomodoroConfig {
            work_duration_sec: 0,
            ..short_config()
        });
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        // An empty interval ends on the first tick.
        assert_eq!(engine.tick().and_then(|e| e.phase_change()), Some(Phase::ShortBreak));
    }

    #[test]
    fn cycles_until_long_break_label() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.snapshot().cycles_until_long_break(), 4);
        engine.start();
        for _ in 0..25 * 60 {
            engine.tick();
        }
        assert_eq!(engine.snapshot().cycles_until_long_break(), 3);
    }
}
