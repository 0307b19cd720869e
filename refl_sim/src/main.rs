//! # Reflectometry Beamline Simulator Binary
//!
//! Builds a beamline from a TOML file on simulated axes, applies operator
//! writes and moves, and steps the axes until they settle.
//!
//! # Usage
//!
//! ```bash
//! # Set theta and move the whole beamline
//! refl_sim --config config/beamline.toml --set theta=0.5 --move
//!
//! # Switch to polarised mode and dump the final state as JSON
//! refl_sim --mode pnr --set smangle=0.3 --move --dump
//!
//! # Verbose logging
//! refl_sim --set theta=1 --move-param theta -v
//! ```

#![deny(warnings)]

use clap::Parser;
use refl_common::beamline::BeamlineConfig;
use refl_common::config::{ConfigLoader, LogLevel};
use refl_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_MAX_SIM_STEPS, DEFAULT_SIM_STEP_S};
use refl_common::value::ParameterValue;
use refl_sim::runner::{RunPlan, SimulationRunner, parse_set_point};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reflectometry beamline simulator
#[derive(Parser, Debug)]
#[command(name = "refl_sim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Drive a simulated reflectometry beamline from the command line")]
#[command(long_about = None)]
struct Args {
    /// Path to the beamline description.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Activate a mode (overrides initial_mode).
    #[arg(short, long)]
    mode: Option<String>,

    /// Write a set point without moving, NAME=VALUE (can be specified multiple times)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_set_point, action = clap::ArgAction::Append)]
    set_points: Vec<(String, ParameterValue)>,

    /// Move a single parameter with its cascade (can be specified multiple times)
    #[arg(long = "move-param", value_name = "NAME", action = clap::ArgAction::Append)]
    move_parameters: Vec<String>,

    /// Trigger a beamline move
    #[arg(long = "move")]
    move_beamline: bool,

    /// Simulation step [s]
    #[arg(long, default_value_t = DEFAULT_SIM_STEP_S)]
    dt: f64,

    /// Upper bound on simulation steps while axes settle
    #[arg(long, default_value_t = DEFAULT_MAX_SIM_STEPS)]
    max_steps: u32,

    /// Print the final parameter, interception and axis state as JSON
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The configured log level is only known once the file is read.
    let config = BeamlineConfig::load(&args.config);
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("refl_sim v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Loading beamline from {}", args.config.display());
    let config = config?;

    let mut runner = SimulationRunner::from_config(&config)?;
    let plan = RunPlan {
        mode: args.mode.clone(),
        set_points: args.set_points.clone(),
        move_parameters: args.move_parameters.clone(),
        move_beamline: args.move_beamline,
        dt: args.dt,
        max_steps: args.max_steps,
    };
    runner.run(&plan)?;

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&runner.snapshot())?);
    }

    info!("refl_sim finished");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        log_level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
