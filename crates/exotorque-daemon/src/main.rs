//! Joint torque estimator daemon (exotorqued)

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use exotorque_core::prelude::*;
use exotorque_daemon::{RunLimits, SimParams, bench, run, scheduler_for};
use exotorque_errors::ExoTorqueError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "exotorqued")]
#[command(about = "Exoskeleton joint torque estimator running on a simulated joint")]
#[command(version)]
#[command(long_about = "
exotorqued calibrates the phase-current offsets with the drive disabled, then
estimates joint torque at a fixed rate from two phase currents and the rotor
angle. Each estimate is written as a little-endian f32 with no framing.

The joint is simulated: a commanded q-axis current is turned into phase-current
conversions at a ramping rotor angle.
")]
struct Cli {
    /// Configuration file (JSON); written with defaults if it does not exist
    #[arg(short, long, value_name = "FILE", env = "EXOTORQUE_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write torque frames ('-' for stdout); discarded if omitted
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    duration_secs: Option<f64>,

    /// Override the configured control frequency
    #[arg(long, value_name = "HZ")]
    frequency_hz: Option<u32>,

    /// Commanded q-axis current of the simulated joint
    #[arg(long, default_value_t = 2.0, value_name = "AMPS", allow_negative_numbers = true)]
    iq_amps: f64,

    /// Peak simulated ADC noise in counts
    #[arg(long, default_value_t = 0.0, value_name = "COUNTS", allow_negative_numbers = true)]
    noise_counts: f64,

    /// Seed for the simulated noise
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Frames may go to stdout; logs always go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "exotorqued={log_level},exotorque_daemon={log_level},exotorque_core={log_level}"
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Load `path`, or create it with defaults when it does not exist yet.
fn load_or_create_config(path: Option<&Path>) -> Result<EstimatorConfig> {
    let Some(path) = path else {
        return Ok(EstimatorConfig::default());
    };

    if path.exists() {
        let config = EstimatorConfig::load_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    } else {
        let config = EstimatorConfig::default();
        config
            .save_to_path(path)
            .with_context(|| format!("failed to write default config to {}", path.display()))?;
        warn!(path = %path.display(), "config file not found; wrote defaults");
        Ok(config)
    }
}

/// Every frame is flushed as it is emitted so the consumer sees one per
/// period.
fn open_output(output: Option<&Path>) -> Result<Box<dyn TorqueSink>> {
    match output {
        None => Ok(Box::new(NullSink)),
        Some(path) if path.as_os_str() == "-" => {
            Ok(Box::new(WriterSink::new(io::stdout()).with_flush_each(true)))
        }
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open output {}", path.display()))?;
            Ok(Box::new(WriterSink::new(file).with_flush_each(true)))
        }
    }
}

fn limits_from(cli: &Cli) -> Result<RunLimits> {
    let max_duration = cli
        .duration_secs
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --duration-secs {secs}"))
        })
        .transpose()?;
    Ok(RunLimits {
        max_ticks: cli.ticks,
        max_duration,
    })
}

fn sim_params_from(cli: &Cli, sensing: &SensingConfig) -> Result<SimParams> {
    let params = SimParams {
        iq_amps: cli.iq_amps,
        noise_counts: cli.noise_counts,
        seed: cli.seed,
        ..SimParams::default()
    };
    params.validate(sensing).map_err(ExoTorqueError::from)?;
    Ok(params)
}

fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_clone.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(stop)
}

fn execute(cli: &Cli, stop: &AtomicBool) -> Result<()> {
    let mut config = load_or_create_config(cli.config.as_deref())?;
    if let Some(frequency_hz) = cli.frequency_hz {
        config.control.frequency_hz = frequency_hz;
    }
    config.validate().map_err(ExoTorqueError::from)?;

    let params = sim_params_from(cli, &config.sensing)?;
    let limits = limits_from(cli)?;
    if limits.max_ticks.is_none() && limits.max_duration.is_none() {
        info!("no tick or duration limit; running until Ctrl-C");
    }

    let (drive, angle, enable) = bench(config.sensing, params);
    let sink = open_output(cli.output.as_deref())?;

    let estimator = TorqueEstimator::new(config.clone(), drive, angle, sink)
        .map_err(ExoTorqueError::from)?;

    enable.set(false);
    let mut running = estimator
        .calibrate()
        .map_err(ExoTorqueError::from)
        .context("offset calibration failed")?;
    enable.set(true);
    info!(iq_amps = cli.iq_amps, "simulated drive enabled");

    let mut scheduler = scheduler_for(&config.control);
    let summary = run(&mut running, &mut scheduler, limits, stop)
        .map_err(ExoTorqueError::from)
        .context("control loop failed")?;
    enable.set(false);

    let (_, _, mut sink) = running.into_parts();
    sink.flush()
        .map_err(ExoTorqueError::from)
        .context("failed to flush torque output")?;

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
    }

    info!(
        ticks = summary.ticks,
        last_joint_torque_nm = ?summary.last_joint_torque_nm,
        "estimator stopped"
    );
    Ok(())
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<ExoTorqueError>() {
        Some(ExoTorqueError::Validation(_)) | Some(ExoTorqueError::Config(_)) => 2,
        Some(ExoTorqueError::Calibration(_)) => 3,
        Some(ExoTorqueError::RT(_)) => 4,
        Some(ExoTorqueError::Io(_)) => 5,
        None => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_default_config {
        return match EstimatorConfig::default().to_json_pretty() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    init_logging(cli.verbose);
    info!("Starting exotorqued v{}", env!("CARGO_PKG_VERSION"));

    let outcome = install_stop_handler().and_then(|stop| execute(&cli, &stop));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("exotorqued failed: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
