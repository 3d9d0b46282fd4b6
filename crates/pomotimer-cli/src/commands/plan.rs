use clap::Args;
use pomotimer_core::{advance, Phase, PomodoroConfig, SettingsStore};
use serde::Serialize;

#[derive(Args)]
pub struct PlanArgs {
    /// Number of transitions to show
    #[arg(long, default_value = "8")]
    pub count: usize,
}

#[derive(Debug, Serialize)]
struct PlannedInterval {
    step: usize,
    phase: Phase,
    cycle_count: u32,
    duration_secs: u64,
}

/// The transitions a freshly reset timer goes through, in order.
fn plan(config: &PomodoroConfig, count: usize) -> Vec<PlannedInterval> {
    let mut phase = Phase::Work;
    let mut cycle_count = 0;
    (1..=count)
        .map(|step| {
            (phase, cycle_count) = advance(phase, cycle_count, config);
            PlannedInterval {
                step,
                phase,
                cycle_count,
                duration_secs: config.duration_for(phase),
            }
        })
        .collect()
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = SettingsStore::open()?.read()?;
    let steps = plan(&config, args.count);
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}
