//! # Pomotimer Core Library
//!
//! This library provides the core logic for the Pomotimer Pomodoro timer.
//! The CLI binary is a thin terminal skin over the same types.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine cycling work, short-break
//!   and long-break intervals
//! - **Driver**: A tokio task ticking the engine once per second and
//!   publishing state and phase-change events
//! - **Storage**: TOML-based configuration holding the durable settings
//! - **Alerts**: Notification and vibration side effects on phase changes
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerDriver`]: Real-time countdown around the engine
//! - [`SettingsStore`]: Durable interval settings with a change feed
//! - [`AlertDispatcher`]: Permission-gated phase alerts

pub mod alerts;
pub mod driver;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use alerts::{AlertDispatcher, DesktopNotifier, Notifier, Permission, TerminalBell, Vibrator};
pub use driver::TimerDriver;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{Config, SettingsStore};
pub use timer::{advance, Phase, PomodoroConfig, TimerEngine, TimerSnapshot};
