//! Headless sandbox: builds the test level, spawns one character and runs a scripted scenario
//! on a fixed tick.

mod scenario;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use locomotion::{
    CharacterSettings, LocomotionError,
    constants::{DEFAULT_TICK_HZ, MAX_DT_S},
};

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "sandbox")]
#[command(about = "Run a scripted locomotion scenario against a static test level", long_about = None)]
struct Cli {
    /// Character settings file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Tick rate (Hz).
    #[arg(long, default_value_t = DEFAULT_TICK_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    hz: u32,

    #[arg(long, value_enum, default_value_t = Scenario::Run)]
    scenario: Scenario,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LocomotionError> {
    let settings = match &cli.settings {
        Some(path) => {
            let settings = CharacterSettings::from_file(path)?;
            log::info!("loaded settings from {}", path.display());
            settings
        }
        None => CharacterSettings::default(),
    };

    let mut dt = 1.0 / cli.hz as f32;
    if dt > MAX_DT_S {
        log::warn!("{} Hz is below the minimum tick rate, clamping dt to {MAX_DT_S}", cli.hz);
        dt = MAX_DT_S;
    }

    log::info!(
        "running {:?} for {} ticks at {} Hz",
        cli.scenario,
        cli.ticks,
        cli.hz
    );
    let summary = scenario::run(cli.scenario, settings, cli.ticks, dt)?;

    let travelled = summary.end - summary.start;
    log::info!(
        "done after {} ticks ({:.1} s): {} transitions, {} deaths, {} respawns",
        summary.ticks,
        summary.ticks as f32 * dt,
        summary.transitions,
        summary.deaths,
        summary.respawns,
    );
    log::info!(
        "final state {:?}, displacement ({:.2}, {:.2}, {:.2})",
        summary.final_state,
        travelled.x,
        travelled.y,
        travelled.z,
    );
    Ok(())
}
