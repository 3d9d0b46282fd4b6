use clap::Subcommand;
use pomotimer_core::storage::TimerSettings;
use pomotimer_core::{PomodoroConfig, SettingsStore};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current interval settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update interval settings; omitted values keep their current setting
    Set {
        /// Work interval in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Short break in minutes
        #[arg(long)]
        short: Option<u32>,
        /// Long break in minutes
        #[arg(long)]
        long: Option<u32>,
        /// Work intervals before a long break
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Restore the default interval settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;
    match action {
        SettingsAction::Show { json } => {
            let settings = TimerSettings::from(&store.read()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
        }
        SettingsAction::Set {
            work,
            short,
            long,
            cycles,
        } => {
            let current = TimerSettings::from(&store.read()?);
            let updated = TimerSettings {
                work_duration_minutes: work.unwrap_or(current.work_duration_minutes),
                short_break_minutes: short.unwrap_or(current.short_break_minutes),
                long_break_minutes: long.unwrap_or(current.long_break_minutes),
                cycles_before_long_break: cycles.unwrap_or(current.cycles_before_long_break),
            };
            store.write(&PomodoroConfig::from(updated))?;
            print_settings(&updated);
        }
        SettingsAction::Reset => {
            store.write(&PomodoroConfig::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

fn print_settings(s: &TimerSettings) {
    println!("work:         {} min", s.work_duration_minutes);
    println!("short break:  {} min", s.short_break_minutes);
    println!("long break:   {} min", s.long_break_minutes);
    println!("cycles:       {}", s.cycles_before_long_break);
}
