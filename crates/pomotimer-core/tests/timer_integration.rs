//! Integration tests for the settings -> driver -> alerts pipeline.
//!
//! These tests verify that stored settings configure the countdown and
//! that phase changes reach an alert listener exactly once.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pomotimer_core::alerts::{NotificationChannel, PhaseAlert, Vibration};
use pomotimer_core::error::Result;
use pomotimer_core::{
    AlertDispatcher, Notifier, Permission, Phase, PomodoroConfig, SettingsStore, TimerDriver,
    Vibrator,
};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Notifier for Recorder {
    fn notify(&self, _channel: &NotificationChannel, alert: &PhaseAlert) -> Result<()> {
        self.0.lock().unwrap().push(alert.title.clone());
        Ok(())
    }
}

impl Vibrator for Recorder {
    fn vibrate(&self, _vibration: Vibration) -> Result<()> {
        self.0.lock().unwrap().push("buzz".into());
        Ok(())
    }
}

#[test]
fn test_settings_roundtrip_scenario() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::at(dir.path().join("config.toml")).unwrap();
    let written = PomodoroConfig::from_minutes(10, 2, 15, 3);
    store.write(&written).unwrap();

    let read = store.read().unwrap();
    assert_eq!(read.work_duration_sec, 600);
    assert_eq!(read.short_break_duration_sec, 120);
    assert_eq!(read.long_break_duration_sec, 900);
    assert_eq!(read.cycles_before_long_break, 3);
}

#[tokio::test(start_paused = true)]
async fn test_stored_settings_drive_countdown_and_alerts() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::at(dir.path().join("config.toml")).unwrap();
    store
        .write(&PomodoroConfig::from_minutes(1, 1, 2, 2))
        .unwrap();

    let mut driver = TimerDriver::new(store.read().unwrap());
    let recorder = Recorder::default();
    let dispatcher = AlertDispatcher::new(recorder.clone(), recorder.clone(), Permission::Granted);
    let alerts = tokio::spawn(dispatcher.run(driver.subscribe()));

    driver.start();
    // work 60s -> short 60s -> work 60s -> long break
    tokio::time::sleep(Duration::from_millis(180_500)).await;

    let snap = driver.snapshot();
    assert_eq!(snap.phase, Phase::LongBreak);
    assert_eq!(snap.cycle_count, 1);
    assert_eq!(snap.seconds_left, 120);
    assert!(snap.running);

    driver.reset();
    let snap = driver.snapshot();
    assert_eq!(snap.phase, Phase::Work);
    assert_eq!(snap.cycle_count, 0);
    assert_eq!(snap.seconds_left, 60);
    assert!(!snap.running);

    // Closing the driver lets the listener drain and exit.
    drop(driver);
    alerts.await.unwrap();
    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec![
            "Short Break Time!",
            "buzz",
            "Ready to Work!",
            "buzz",
            "Long Break Time!",
            "buzz",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_denied_permission_keeps_timer_running_silently() {
    let mut driver = TimerDriver::new(PomodoroConfig {
        work_duration_sec: 2,
        short_break_duration_sec: 2,
        long_break_duration_sec: 2,
        cycles_before_long_break: 4,
    });
    let recorder = Recorder::default();
    let dispatcher = AlertDispatcher::new(recorder.clone(), recorder.clone(), Permission::Denied);
    let alerts = tokio::spawn(dispatcher.run(driver.subscribe()));

    driver.start();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(driver.snapshot().phase, Phase::ShortBreak);

    drop(driver);
    alerts.await.unwrap();
    assert!(recorder.0.lock().unwrap().is_empty());
}
