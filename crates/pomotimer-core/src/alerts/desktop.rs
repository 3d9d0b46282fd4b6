use std::io::Write;
use std::sync::Mutex;

use notify_rust::Notification;
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::Urgency;

#[cfg(all(unix, not(target_os = "macos")))]
use super::channel::Importance;
use super::channel::{NotificationChannel, PhaseAlert, Vibration};
use super::dispatcher::{Notifier, Vibrator};
use crate::error::Result;

/// Desktop notifications through the platform notification daemon.
pub struct DesktopNotifier {
    appname: String,
}

impl DesktopNotifier {
    pub fn new(appname: impl Into<String>) -> Self {
        Self {
            appname: appname.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("pomotimer")
    }
}

impl Notifier for DesktopNotifier {
    #[cfg_attr(
        not(all(unix, not(target_os = "macos"))),
        allow(unused_variables)
    )]
    fn notify(&self, channel: &NotificationChannel, alert: &PhaseAlert) -> Result<()> {
        let mut notification = Notification::new();
        notification
            .appname(&self.appname)
            .summary(&alert.title)
            .body(&alert.body)
            .icon("alarm-clock");

        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(match channel.importance {
            Importance::High => Urgency::Critical,
        });

        notification.show()?;
        Ok(())
    }
}

/// Stand-in for a vibration motor on machines without one: rings the
/// terminal bell.
pub struct TerminalBell {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalBell {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Ring on stderr so the timer screen on stdout is left alone.
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }
}

impl Vibrator for TerminalBell {
    fn vibrate(&self, vibration: Vibration) -> Result<()> {
        tracing::trace!(duration_ms = vibration.duration.as_millis() as u64, "bell");
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}
