//! u-dispatch - Command Line Interface
//!
//! Optimizes dispatch requests from JSON files, generates synthetic
//! scenarios to feed them and replays optimized scenarios as simulations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use u_dispatch::api::{handle_request, OptimizationRequest};
use u_dispatch::config::is_valid_speed;
use u_dispatch::scenario::{generate, Scenario};
use u_dispatch::simulation::{replay_solution, ReplayOptions};
use u_dispatch::{OptimizerConfig, RouteOptimizer};

#[derive(Parser)]
#[command(name = "u-dispatch")]
#[command(version)]
#[command(about = "Pickup-and-delivery route optimization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize routes for a request file
    Optimize {
        /// Request JSON with orders and vehicles
        #[arg(short, long)]
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip 2-opt improvement regardless of the request
        #[arg(long)]
        no_2opt: bool,

        /// Average vehicle speed in km/h
        #[arg(long, default_value = "40")]
        speed: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a synthetic request
    Generate {
        /// Scenario preset
        #[arg(short, long, value_enum, default_value = "medium-uniform")]
        preset: Preset,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Base instant for time windows (RFC 3339); defaults to now
        #[arg(long)]
        base: Option<DateTime<Utc>>,

        /// Write the request here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a scenario, optimize it and replay the routes
    Simulate {
        /// Scenario preset
        #[arg(short, long, value_enum, default_value = "small-peak")]
        preset: Preset,

        /// Random seed for generation and replay
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Base instant for time windows (RFC 3339); defaults to today 00:00 UTC
        #[arg(long)]
        base: Option<DateTime<Utc>>,

        /// Minute of day at which routes start
        #[arg(long, default_value = "480")]
        shift_start: i64,

        /// Probability that a delivery fails on site
        #[arg(long, default_value = "0")]
        failure_rate: f64,

        /// Write state and metrics as JSON here instead of printing the report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Preset {
    /// 20 rush-hour orders, 3 vehicles
    SmallPeak,
    /// 50 uniform orders, 5 vehicles
    MediumUniform,
    /// 100 evening orders, 10 vehicles
    LargeEvening,
}

impl Preset {
    fn scenario(self) -> Scenario {
        match self {
            Preset::SmallPeak => Scenario::small_peak(),
            Preset::MediumUniform => Scenario::medium_uniform(),
            Preset::LargeEvening => Scenario::large_evening(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Optimize { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            no_2opt,
            speed,
            verbose: _,
        } => optimize(&input, output.as_deref(), no_2opt, speed),
        Commands::Generate {
            preset,
            seed,
            base,
            output,
        } => generate_scenario(preset, seed, base.unwrap_or_else(Utc::now), output.as_deref()),
        Commands::Simulate {
            preset,
            seed,
            base,
            shift_start,
            failure_rate,
            output,
        } => {
            let base = base
                .unwrap_or_else(|| Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc());
            let config = OptimizerConfig::default().with_shift_start(shift_start);
            simulate(preset, seed, base, config, failure_rate, output.as_deref())
        }
    }
}

fn optimize(input: &Path, output: Option<&Path>, no_2opt: bool, speed: f64) -> Result<()> {
    ensure!(
        is_valid_speed(speed),
        "Speed must be a positive number of km/h, got {}",
        speed
    );
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read request file: {}", input.display()))?;
    let mut request = OptimizationRequest::from_json(&content)
        .with_context(|| format!("Failed to load request from: {}", input.display()))?;
    if no_2opt {
        request.use_2opt = false;
    }

    let config = OptimizerConfig::default().with_average_speed(speed);
    let mut optimizer = RouteOptimizer::new(config);
    let result = handle_request(&mut optimizer, &request)?;

    info!(
        "{} routes, {} unassigned, {:.2} km in {:.3} s",
        result.routes.len(),
        result.unassigned_orders.len(),
        result.total_distance_km,
        result.optimization_time_seconds
    );
    write_output(output, &result.to_json()?)
}

fn generate_scenario(
    preset: Preset,
    seed: u64,
    base: DateTime<Utc>,
    output: Option<&Path>,
) -> Result<()> {
    let request = generate(&preset.scenario(), seed, base);
    info!(
        "generated {:?} scenario: {} orders, {} vehicles (seed {})",
        preset,
        request.orders.len(),
        request.vehicles.len(),
        seed
    );
    write_output(output, &request.to_json()?)
}

fn simulate(
    preset: Preset,
    seed: u64,
    base: DateTime<Utc>,
    config: OptimizerConfig,
    failure_rate: f64,
    output: Option<&Path>,
) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&failure_rate),
        "Failure rate must be between 0 and 1, got {}",
        failure_rate
    );
    let scenario = preset.scenario();
    let request = generate(&scenario, seed, base);
    let mut optimizer = RouteOptimizer::new(config.clone());
    let solution = optimizer.optimize(&request.orders, &request.vehicles, request.use_2opt);

    let options = ReplayOptions {
        end_minutes: scenario.simulation_hours * 60.0,
        seed,
        failure_rate,
    };
    let report = replay_solution(&solution, &request.orders, &request.vehicles, &config, &options);
    match output {
        Some(_) => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize simulation report")?;
            write_output(output, &json)
        }
        None => {
            print!("{}", report.metrics);
            Ok(())
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
