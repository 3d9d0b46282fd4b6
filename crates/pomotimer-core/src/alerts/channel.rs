use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Channel importance. Phase alerts only ever post at high importance,
/// which desktops render as a critical notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
}

/// The single channel phase alerts are posted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationChannel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub importance: Importance,
    /// Alternating off/on durations in milliseconds, starting with off.
    pub vibration_pattern: [u64; 4],
}

impl NotificationChannel {
    pub const fn pomodoro() -> Self {
        Self {
            id: "pomodoro_channel",
            name: "Pomodoro Alert",
            description: "Beep & vibrate when a phase changes",
            importance: Importance::High,
            vibration_pattern: [0, 300, 200, 300],
        }
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::pomodoro()
    }
}

/// Title and body of the notification posted when `phase` begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseAlert {
    pub phase: Phase,
    pub title: String,
    pub body: String,
}

impl PhaseAlert {
    pub fn for_phase(phase: Phase) -> Self {
        let title = match phase {
            Phase::Work => "Ready to Work!",
            Phase::ShortBreak => "Short Break Time!",
            Phase::LongBreak => "Long Break Time!",
        };
        Self {
            phase,
            title: title.to_string(),
            body: format!("Switched to {}", phase.label().to_lowercase()),
        }
    }
}

/// A single vibration burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vibration {
    pub duration: Duration,
    /// `None` means the device's default amplitude.
    pub amplitude: Option<u8>,
}

impl Vibration {
    pub const fn one_shot() -> Self {
        Self {
            duration: Duration::from_millis(500),
            amplitude: None,
        }
    }
}
