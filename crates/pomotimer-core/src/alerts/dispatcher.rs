use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use super::channel::{NotificationChannel, PhaseAlert, Vibration};
use crate::error::Result;
use crate::events::Event;
use crate::storage::NotificationsConfig;

/// Posts a notification on a channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, channel: &NotificationChannel, alert: &PhaseAlert) -> Result<()>;
}

/// Produces a physical (or audible) buzz.
pub trait Vibrator: Send + Sync {
    fn vibrate(&self, vibration: Vibration) -> Result<()>;
}

/// Whether the user allows phase alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl From<&NotificationsConfig> for Permission {
    fn from(cfg: &NotificationsConfig) -> Self {
        if cfg.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }
}

/// Turns phase-changed events into a notification plus a vibration.
pub struct AlertDispatcher<N, V> {
    channel: NotificationChannel,
    notifier: N,
    vibrator: V,
    permission: Permission,
    vibration_enabled: bool,
}

impl<N: Notifier, V: Vibrator> AlertDispatcher<N, V> {
    pub fn new(notifier: N, vibrator: V, permission: Permission) -> Self {
        Self {
            channel: NotificationChannel::pomodoro(),
            notifier,
            vibrator,
            permission,
            vibration_enabled: true,
        }
    }

    /// Build from the `[notifications]` section of the config file.
    pub fn from_config(notifier: N, vibrator: V, cfg: &NotificationsConfig) -> Self {
        let mut dispatcher = Self::new(notifier, vibrator, Permission::from(cfg));
        dispatcher.vibration_enabled = cfg.vibration;
        dispatcher
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Fire alerts for `event`. Returns whether anything was fired.
    ///
    /// A failed notification does not stop the vibration; the first error
    /// is returned after both were attempted.
    pub fn handle(&self, event: &Event) -> Result<bool> {
        let Some(phase) = event.phase_change() else {
            return Ok(false);
        };
        if self.permission == Permission::Denied {
            tracing::debug!(%phase, "alert suppressed: permission denied");
            return Ok(false);
        }

        let alert = PhaseAlert::for_phase(phase);
        let notified = self.notifier.notify(&self.channel, &alert);
        if let Err(ref e) = notified {
            tracing::warn!(error = %e, "failed to post notification");
        }
        if self.vibration_enabled {
            if let Err(e) = self.vibrator.vibrate(Vibration::one_shot()) {
                tracing::warn!(error = %e, "failed to vibrate");
                notified?;
                return Err(e);
            }
        }
        notified?;
        Ok(true)
    }
}

impl<N, V> AlertDispatcher<N, V>
where
    N: Notifier + 'static,
    V: Vibrator + 'static,
{
    /// Consume events until the sender side closes.
    ///
    /// Backends may block (desktop notifications go over D-Bus), so each
    /// transition is handled on the blocking pool, one at a time.
    pub async fn run(self, mut events: broadcast::Receiver<Event>) {
        let dispatcher = Arc::new(self);
        loop {
            match events.recv().await {
                Ok(event) if event.phase_change().is_some() => {
                    let dispatcher = Arc::clone(&dispatcher);
                    // handle() logs its own failures.
                    if let Err(e) =
                        tokio::task::spawn_blocking(move || dispatcher.handle(&event)).await
                    {
                        tracing::warn!(error = %e, "alert task failed");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "alert listener lagged behind timer events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
