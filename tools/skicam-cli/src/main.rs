//! SkiCam CLI: drive the framing controller offline.
//!
//! Usage:
//!   skicam simulate [OPTIONS]        Run a synthetic skier path
//!   skicam replay <OBSERVATIONS>     Run a recorded detection stream
//!   skicam config                    Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skicam_common::config::AppConfig;
use skicam_common::logging::{init_logging, level_for_verbosity};

mod commands;

use commands::simulate::Scenario;

#[derive(Parser)]
#[command(
    name = "skicam",
    about = "Automatic camera framing for skiers",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller on a synthetic skier path
    Simulate {
        /// Skier motion to simulate
        #[arg(long, value_enum, default_value_t = Scenario::Step)]
        scenario: Scenario,

        /// Number of frames
        #[arg(long, default_value = "300")]
        frames: u32,

        /// Capture rate in frames per second (defaults to the configured nominal rate)
        #[arg(long)]
        fps: Option<u32>,

        /// Proportional gain for all axes
        #[arg(long)]
        kp: Option<f64>,

        /// Derivative gain for all axes
        #[arg(long)]
        kd: Option<f64>,

        /// Error smoothing factor for all axes
        #[arg(long)]
        alpha: Option<f64>,

        /// Write emitted viewports as JSONL
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a recorded observation stream through the controller
    Replay {
        /// Observation JSONL file
        path: PathBuf,

        /// Write emitted viewports as JSONL
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process every Nth frame (overrides the config)
        #[arg(long)]
        frame_skip: Option<u32>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Validate and print this file instead
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = level_for_verbosity(true).to_string();
    }
    init_logging(&logging)?;
    tracing::debug!(framing = ?config.framing, "Loaded configuration");

    match cli.command {
        Commands::Simulate {
            scenario,
            frames,
            fps,
            kp,
            kd,
            alpha,
            output,
        } => commands::simulate::run(
            &config.framing,
            commands::simulate::SimulateArgs {
                scenario,
                frames,
                fps,
                kp,
                kd,
                alpha,
            },
            output,
        ),
        Commands::Replay {
            path,
            output,
            frame_skip,
        } => commands::replay::run(&config.framing, path, output, frame_skip),
        Commands::Config { path } => commands::config::run(config, path),
    }
}
