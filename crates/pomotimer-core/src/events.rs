use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of the timer produces an Event.
/// The terminal UI renders from them; the alert layer subscribes to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// An interval ran out and the timer moved on to `phase`.
    PhaseChanged {
        previous: Phase,
        phase: Phase,
        cycle_count: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The config was replaced and the timer reset against it.
    ConfigApplied {
        work_duration_sec: u64,
        short_break_duration_sec: u64,
        long_break_duration_sec: u64,
        cycles_before_long_break: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Destination phase if this event is a phase transition.
    pub fn phase_change(&self) -> Option<Phase> {
        match self {
            Event::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_changed_serializes_with_tag() {
        let event = Event::PhaseChanged {
            previous: Phase::Work,
            phase: Phase::ShortBreak,
            cycle_count: 1,
            duration_secs: 300,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["phase"], "short_break");
        assert_eq!(event.phase_change(), Some(Phase::ShortBreak));
    }

    #[test]
    fn other_events_are_not_phase_changes() {
        assert_eq!(Event::TimerReset { at: Utc::now() }.phase_change(), None);
    }
}
