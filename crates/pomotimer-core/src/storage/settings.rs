//! Durable timer settings.
//!
//! Four integers in the `[timer]` table of the config file. Reads fall back
//! to defaults for absent keys; writes replace all four at once and publish
//! the new value to every subscriber of the settings feed. Writes made by
//! other handles or processes reach the feed through [`SettingsStore::refresh`],
//! which [`SettingsStore::watch`] runs periodically.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::config::{Config, TimerSettings, CONFIG_FILE};
use super::data_dir;
use crate::error::Result;
use crate::timer::PomodoroConfig;

/// How often [`SettingsStore::watch`] re-reads the file.
pub const WATCH_PERIOD: Duration = Duration::from_secs(1);

pub struct SettingsStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles; last write wins.
    write_lock: Mutex<()>,
    feed: watch::Sender<PomodoroConfig>,
}

impl SettingsStore {
    /// Open the store at the default config location.
    pub fn open() -> Result<Self> {
        Self::at(data_dir()?.join(CONFIG_FILE))
    }

    /// Open the store backed by the config file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let initial = Config::load_from(&path)?.pomodoro();
        let (feed, _) = watch::channel(initial);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            feed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current durable configuration, defaults for anything unset.
    pub fn read(&self) -> Result<PomodoroConfig> {
        Ok(Config::load_from(&self.path)?.pomodoro())
    }

    /// Persist all four settings together.
    ///
    /// Other sections of the config file are left as they are.
    ///
    /// # Errors
    ///
    /// Returns a validation error for durations under a minute or a zero
    /// cycle count, or an error if the file cannot be read or written.
    pub fn write(&self, config: &PomodoroConfig) -> Result<()> {
        let settings = TimerSettings::from(config);
        PomodoroConfig::from(settings).validate()?;
        let _guard = self.lock_writes();

        let mut file = Config::load_from(&self.path)?;
        file.timer = settings;
        if let Err(e) = file.save_to(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save settings");
            return Err(e);
        }

        // Publish what a subsequent read returns (whole minutes).
        let stored = file.pomodoro();
        tracing::debug!(?stored, "settings updated");
        self.feed.send_replace(stored);
        Ok(())
    }

    /// Continuous feed of the configuration; yields the current value first.
    pub fn subscribe(&self) -> watch::Receiver<PomodoroConfig> {
        self.feed.subscribe()
    }

    /// Last value published on the feed.
    pub fn current(&self) -> PomodoroConfig {
        *self.feed.borrow()
    }

    /// Re-read the file and publish it if it differs from the feed.
    /// Returns whether anything was published.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be parsed; the feed keeps its last value.
    pub fn refresh(&self) -> Result<bool> {
        let _guard = self.lock_writes();
        let latest = self.read()?;
        if latest == self.current() {
            return Ok(false);
        }
        tracing::debug!(?latest, "settings changed on disk");
        self.feed.send_replace(latest);
        Ok(true)
    }

    /// Spawn a task that calls [`refresh`](Self::refresh) every `period`
    /// until the store is dropped or the handle aborted.
    pub fn watch(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut failing = false;
            loop {
                interval.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                match store.refresh() {
                    Ok(_) => failing = false,
                    // Warn once per broken stretch, not every period.
                    Err(e) if !failing => {
                        failing = true;
                        tracing::warn!(path = %store.path.display(), error = %e, "failed to reload settings");
                    }
                    Err(_) => {}
                }
            }
        })
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
