pub(crate) mod config;
mod engine;
mod phase;

pub use config::PomodoroConfig;
pub use engine::{TimerEngine, TimerSnapshot};
pub use phase::{advance, Phase};
