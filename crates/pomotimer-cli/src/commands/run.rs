use std::io::Write;
use std::sync::Arc;

use clap::Args;
use pomotimer_core::storage::{NotificationsConfig, WATCH_PERIOD};
use pomotimer_core::{
    AlertDispatcher, Config, DesktopNotifier, Permission, SettingsStore, TerminalBell, TimerDriver,
    TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const BAR_WIDTH: usize = 20;

#[derive(Args)]
pub struct RunArgs {
    /// Start counting down immediately
    #[arg(long)]
    pub start: bool,
    /// No notifications or bell for this session
    #[arg(long)]
    pub quiet: bool,
}

/// Line commands accepted on stdin while the timer screen is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenCommand {
    StartPause,
    Reset,
    Settings,
    Quit,
}

impl ScreenCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" | "s" | "start" | "pause" => Some(Self::StartPause),
            "r" | "reset" => Some(Self::Reset),
            "c" | "settings" => Some(Self::Settings),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(timer_screen(args))
}

async fn timer_screen(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = Arc::new(SettingsStore::open()?);
    let watcher = store.watch(WATCH_PERIOD);
    let mut settings = store.subscribe();
    let mut driver = TimerDriver::new(store.current());

    let notifications = if args.quiet {
        NotificationsConfig {
            enabled: false,
            ..config.notifications
        }
    } else {
        config.notifications
    };
    let dispatcher = AlertDispatcher::from_config(
        DesktopNotifier::default(),
        TerminalBell::stderr(),
        &notifications,
    );
    if dispatcher.permission() == Permission::Denied {
        tracing::info!("phase alerts disabled");
    }
    let alerts = tokio::spawn(dispatcher.run(driver.subscribe()));

    let mut state = driver.watch_state();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_help();
    if args.start {
        driver.start();
    }
    render(&state.borrow_and_update())?;

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *state.borrow_and_update();
                render(&snapshot)?;
            }
            Ok(()) = settings.changed() => {
                let latest = *settings.borrow_and_update();
                driver.apply_config(latest);
                println!();
                println!("settings changed, timer reset");
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match ScreenCommand::parse(&line) {
                    Some(ScreenCommand::StartPause) => {
                        driver.start_pause();
                    }
                    Some(ScreenCommand::Reset) => {
                        driver.reset();
                    }
                    Some(ScreenCommand::Settings) => {
                        println!();
                        match store.refresh() {
                            Ok(_) => {
                                let latest = *settings.borrow_and_update();
                                driver.apply_config(latest);
                                println!(
                                    "settings reloaded from {} (edit with `pomotimer-cli settings set`)",
                                    store.path().display()
                                );
                            }
                            // A broken file must not end the session.
                            Err(e) => {
                                tracing::warn!(error = %e, "settings reload failed");
                                eprintln!("error: {e}");
                            }
                        }
                    }
                    Some(ScreenCommand::Quit) => break,
                    None => print_help(),
                }
            }
        }
    }

    println!();
    drop(driver);
    watcher.abort();
    alerts.abort();
    Ok(())
}

fn print_help() {
    println!("[Enter/s] start/pause   [r] reset   [c] reload settings   [q] quit");
}

fn render(snapshot: &TimerSnapshot) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "\r\x1b[2K{}", render_line(snapshot))?;
    out.flush()
}

fn render_line(s: &TimerSnapshot) -> String {
    let filled = ((s.progress.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
    let button = if s.running { "running" } else { "paused" };
    let mut line = format!(
        "{:<11} {:02}:{:02} [{bar}] {button}",
        s.phase.label(),
        s.seconds_left / 60,
        s.seconds_left % 60,
    );
    if !s.phase.is_break() {
        let left = s.cycles_until_long_break();
        let plural = if left == 1 { "" } else { "s" };
        line.push_str(&format!("  {left} cycle{plural} until a long break"));
    }
    line
}
