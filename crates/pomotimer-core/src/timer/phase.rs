use serde::{Deserialize, Serialize};

use super::config::PomodoroConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Human-facing label, as shown on the timer screen.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Work)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Compute the phase that follows `current` once its interval finishes.
///
/// Finishing a work interval counts one cycle. When the count reaches a
/// multiple of `cycles_before_long_break` the next phase is a long break and
/// the counter restarts at 1 (not 0). Finishing any break returns to work
/// with the counter untouched.
pub fn advance(current: Phase, cycle_count: u32, config: &PomodoroConfig) -> (Phase, u32) {
    match current {
        Phase::Work => {
            let count = cycle_count.saturating_add(1);
            // Zero behaves as 1.
            let threshold = config.cycles_before_long_break.max(1);
            if count % threshold == 0 {
                (Phase::LongBreak, 1)
            } else {
                (Phase::ShortBreak, count)
            }
        }
        Phase::ShortBreak | Phase::LongBreak => (Phase::Work, cycle_count),
    }
}
