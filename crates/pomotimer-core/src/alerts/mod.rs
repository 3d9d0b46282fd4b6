//! Phase-transition alerts: one notification and one vibration per change.
//!
//! [`Notifier`] and [`Vibrator`] are the OS seams. [`AlertDispatcher`]
//! listens to timer events and fires both when permission is granted.

mod channel;
mod desktop;
mod dispatcher;

pub use channel::{Importance, NotificationChannel, PhaseAlert, Vibration};
pub use desktop::{DesktopNotifier, TerminalBell};
pub use dispatcher::{AlertDispatcher, Notifier, Permission, Vibrator};
