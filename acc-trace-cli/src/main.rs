//! ACC Trace Validator CLI Application
//!
//! Command-line front end for the acc-trace-validator library. It adds:
//! - TOML configuration with command-line overrides
//! - Parallel execution of the check battery
//! - Text report and JSON summary output
//! - A non-zero exit status when the pass rate falls below the minimum

use acc_trace_validator::{
    ingest, read_asc_file, summarize, CheckKind, SignalDatabase, ViolationResult,
};
use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod report;

use config::AppConfig;
use report::RunInfo;

/// ACC Trace Validator - Check CAN traces against ACC safety rules
#[derive(Parser, Debug)]
#[command(name = "acc-trace")]
#[command(about = "Validate ACC CAN traces (ASC) against a DBC and safety checks", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the ASC trace to validate
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Path to the DBC signal database
    #[arg(short, long, value_name = "FILE")]
    dbc: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the JSON summary to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Overspeed threshold in km/h
    #[arg(long, value_name = "KMH")]
    overspeed: Option<f64>,

    /// Message timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Only consider this message for the timeout check
    #[arg(long, value_name = "NAME")]
    timeout_message: Option<String>,

    /// Minimum pass rate (percent) for a zero exit status
    #[arg(long, value_name = "PERCENT")]
    min_pass_rate: Option<f64>,

    /// Print every violation
    #[arg(long)]
    details: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("ACC Trace Validator CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using validator library v{}", acc_trace_validator::VERSION);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Run the whole pipeline; returns whether the pass rate met the minimum
fn run(args: &Args) -> Result<bool> {
    let config = resolve_config(args)?;

    let dbc_path = config
        .input
        .dbc
        .clone()
        .context("No DBC file given (use --dbc or [input] dbc)")?;
    let log_path = config
        .input
        .log
        .clone()
        .context("No trace file given (use --log or [input] log)")?;

    let database = SignalDatabase::load(&dbc_path)
        .with_context(|| format!("Failed to load DBC: {:?}", dbc_path))?;
    for message in database.messages() {
        log::debug!(
            "  {} (0x{:X}): {} signals",
            message.name,
            message.id,
            message.signals.len()
        );
    }

    let frames = read_asc_file(&log_path)
        .with_context(|| format!("Failed to read trace: {:?}", log_path))?;
    let frame_count = frames.len();

    let samples = ingest(frames, &database);

    let results: Vec<ViolationResult> = CheckKind::ALL
        .par_iter()
        .map(|check| check.run(&samples, &database, &config.checks))
        .collect();
    let summary = summarize(&results);

    if !args.quiet {
        let info = RunInfo {
            log: &log_path,
            dbc: &dbc_path,
            database: database.stats(),
            frames: frame_count,
            samples: samples.len(),
        };
        print!(
            "{}",
            report::render_text(
                &info,
                &summary,
                config.output.details,
                config.output.min_pass_rate
            )
        );
    }

    if let Some(json_path) = &config.output.json {
        report::write_json(&summary, json_path)?;
    }

    Ok(summary.pass_rate >= config.output.min_pass_rate)
}

/// Load the config file, if any, and apply command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(log) = &args.log {
        config.input.log = Some(log.clone());
    }
    if let Some(dbc) = &args.dbc {
        config.input.dbc = Some(dbc.clone());
    }
    if let Some(json) = &args.json {
        config.output.json = Some(json.clone());
    }
    if let Some(threshold) = args.overspeed {
        config.checks = config.checks.with_overspeed_threshold(threshold);
    }
    if let Some(seconds) = args.timeout {
        config.checks = config.checks.with_timeout(seconds);
    }
    if let Some(message) = &args.timeout_message {
        config.checks = config.checks.with_timeout_message(message.clone());
    }
    if let Some(rate) = args.min_pass_rate {
        config.output.min_pass_rate = rate;
    }
    config.output.details |= args.details;

    config::validate(&config)?;
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
