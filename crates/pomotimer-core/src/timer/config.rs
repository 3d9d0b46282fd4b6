use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::error::ValidationError;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 30;
pub const DEFAULT_CYCLES_BEFORE_LONG_BREAK: u32 = 4;

/// Interval durations and the long-break threshold.
///
/// Treated as an immutable value: a settings update replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    pub work_duration_sec: u64,
    pub short_break_duration_sec: u64,
    pub long_break_duration_sec: u64,
    pub cycles_before_long_break: u32,
}

impl PomodoroConfig {
    /// Build a config from whole minutes, the unit settings are stored in.
    pub fn from_minutes(work: u32, short_break: u32, long_break: u32, cycles: u32) -> Self {
        Self {
            work_duration_sec: u64::from(work) * 60,
            short_break_duration_sec: u64::from(short_break) * 60,
            long_break_duration_sec: u64::from(long_break) * 60,
            cycles_before_long_break: cycles,
        }
    }

    /// Interval duration in seconds for `phase`.
    pub fn duration_for(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_duration_sec,
            Phase::ShortBreak => self.short_break_duration_sec,
            Phase::LongBreak => self.long_break_duration_sec,
        }
    }

    /// Reject zero durations and a zero long-break threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let durations = [
            ("work_duration", self.work_duration_sec),
            ("short_break_duration", self.short_break_duration_sec),
            ("long_break_duration", self.long_break_duration_sec),
        ];
        for (field, secs) in durations {
            if secs == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "duration must be positive".into(),
                });
            }
        }
        if self.cycles_before_long_break == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cycles_before_long_break".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self::from_minutes(
            DEFAULT_WORK_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
            DEFAULT_CYCLES_BEFORE_LONG_BREAK,
        )
    }
}
