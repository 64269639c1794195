//! Thermistor Calibrator Simulator
//!
//! Runs the calibration loop on your PC against a simulated thermistor bank.
//! The bath follows whatever reference you type, so the session behaves like
//! the bench with perfectly obedient hardware.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive session on the terminal
//! cargo run --bin thermcal_sim
//!
//! # Scripted session with ADC noise, outcome as JSON
//! cargo run --bin thermcal_sim -- --script 20,30,40,50,# --noise 2 --json
//!
//! # Verify the factory calibration
//! cargo run --bin thermcal_sim -- --mode check --script 25,35,#
//! ```
//!
//! Calibrations live only for one run; nothing is written to disk.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use embassy_futures::block_on;
use thermcal::adapters::{
    BathFollower, RecordingClock, ScriptedInput, SimulatedThermistors, StdClock, StdinInput,
    StdoutOutput,
};
use thermcal::{CalibrationConfig, Calibrator, Clock, TextInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Collect rows and fit a new calibration
    Calibrate,
    /// Compare the current calibration against reference values
    Check,
}

#[derive(Parser, Debug)]
#[command(
    name = "thermcal_sim",
    about = "Run the thermistor calibrator against simulated hardware"
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Mode::Calibrate)]
    mode: Mode,
    /// Uniform ADC noise amplitude in counts
    #[arg(long, default_value_t = 0.0)]
    noise: f32,
    /// Seed for the noise generator
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Comma separated operator entries instead of the terminal, e.g. `20,30,#`
    #[arg(long)]
    script: Option<String>,
    /// Use bench timing (sampling, polling and startup delays)
    #[arg(long)]
    realtime: bool,
    /// Print the session outcome as JSON
    #[arg(long)]
    json: bool,
    /// Print the full readings table before the statistics
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bath = Rc::new(Cell::new(0.0));
    let bank = SimulatedThermistors::new(bath.clone(), cli.seed).with_noise(cli.noise);

    let config = if cli.realtime {
        CalibrationConfig::DEFAULT
    } else {
        CalibrationConfig::fast()
    };

    match &cli.script {
        Some(script) => {
            let entries: Vec<String> = script
                .split(',')
                .map(|entry| format!("{}\n", entry.trim()))
                .collect();
            let batches: Vec<&str> = entries.iter().map(String::as_str).collect();
            let input = BathFollower::new(ScriptedInput::new(&batches), bath);
            if cli.realtime {
                run_session(&cli, input, bank, StdClock, config)
            } else {
                run_session(&cli, input, bank, RecordingClock::new(), config)
            }
        }
        None => {
            let input = BathFollower::new(StdinInput::spawn(), bath);
            // keep polling gentle on a live terminal
            let config = CalibrationConfig {
                input_poll_ms: CalibrationConfig::DEFAULT.input_poll_ms,
                ..config
            };
            run_session(&cli, input, bank, StdClock, config)
        }
    }
}

/// Run one session from the factory calibration
fn run_session<I: TextInput, C: Clock>(
    cli: &Cli,
    input: I,
    bank: SimulatedThermistors,
    clock: C,
    config: CalibrationConfig,
) -> Result<()> {
    let mut calibrator = Calibrator::new(input, StdoutOutput, bank, clock, config)
        .with_readings_dump(cli.dump);

    match cli.mode {
        Mode::Calibrate => {
            let outcome = block_on(calibrator.calibrate()).context("calibration session")?;
            log::info!("{} channels adopted", outcome.adopted);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Mode::Check => {
            calibrator.report_calibration();
            let outcome = block_on(calibrator.check()).context("verification session")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
    }

    Ok(())
}
