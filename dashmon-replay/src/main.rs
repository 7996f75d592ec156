// dashmon Replay - CSV replay for dashmon monitors
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # dashmon-replay
//!
//! Replays a CSV metric log through one dashmon domain monitor and prints
//! the resulting summary report as JSON on stdout. Logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Summarize the last 24 hours of a system metrics log
//! dashmon-replay --csv metrics.csv --domain system
//!
//! # Financial log, one week window, pretty output
//! dashmon-replay --csv revenue.csv --domain financial --window-hours 168 --pretty
//! ```

mod replay;

use clap::Parser;
use dashmon::{Domain, MonitorConfig};
use replay::{ReplayConfig, ReplayEngine, ReplayError};
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// dashmon CSV replay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to replay (timestamp_ms,name,value,unit,category[,tags])
    #[arg(short, long)]
    csv: String,

    /// Domain monitor to replay into (ai, financial, system, engagement)
    #[arg(short, long, default_value = "system")]
    domain: Domain,

    /// Summary window in hours, measured back from the last row
    #[arg(short, long, default_value = "24.0")]
    window_hours: f64,

    /// Monitor sizing as a JSON file
    #[arg(long)]
    config: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("dashmon-replay v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ReplayError> {
    let monitor = match &args.config {
        Some(path) => MonitorConfig::from_path(path)?,
        None => MonitorConfig::default(),
    };

    let engine = ReplayEngine::from_csv(ReplayConfig {
        csv_path: args.csv.clone(),
        domain: args.domain,
        window_hours: args.window_hours,
        monitor,
    })?;

    let info = engine.dataset_info();
    info!(
        "Dataset: {} rows, {} malformed, {}ms span, categories [{}]",
        info.row_count,
        info.malformed_count,
        info.duration_ms,
        info.categories.join(", ")
    );

    let outcome = engine.run();
    info!(
        "{} recorded, {} rejected, {} alerts raised while recording",
        outcome.recorded, outcome.rejected, outcome.alerts_raised
    );

    let json = if args.pretty {
        outcome.report.to_json_pretty()?
    } else {
        outcome.report.to_json()?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
