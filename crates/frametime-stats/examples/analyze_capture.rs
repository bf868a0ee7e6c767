//! Print a frametime report for a CSV capture
//!
//! Usage: cargo run -p frametime-stats --example analyze_capture -- <capture.csv> [config.toml]
//!
//! The CSV needs a header row with at least `TimeInSeconds` and
//! `MsBetweenPresents`; other numeric columns are picked up when known.

use anyhow::{bail, Context, Result};
use frametime_stats::report::{OutputFormat, Reporter, SessionReport};
use frametime_stats::{CaptureSession, Metric, MetricCalculator, StatisticsConfig};
use std::env;
use std::fs;

fn read_columns(path: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read capture: {path}"))?;
    let mut lines = content.lines();
    let Some(header) = lines.next() else {
        bail!("Capture {path} is empty");
    };

    let names: Vec<String> = header.split(',').map(|name| name.trim().to_string()).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (row, line) in lines.enumerate().filter(|(_, line)| !line.trim().is_empty()) {
        for (column, field) in columns.iter_mut().zip(line.split(',')) {
            // Non-numeric columns (application name, runtime) become NaN and
            // are dropped below.
            column.push(field.trim().parse().unwrap_or(f64::NAN));
        }
        tracing::trace!(row, "parsed capture row");
    }

    Ok(names
        .into_iter()
        .zip(columns)
        .filter(|(_, values)| values.iter().all(|value| value.is_finite()))
        .collect())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(capture_path) = args.get(1) else {
        bail!("Usage: analyze_capture <capture.csv> [config.toml]");
    };
    let config = match args.get(2) {
        Some(path) => StatisticsConfig::from_file(path)?,
        None => StatisticsConfig::default(),
    };

    let session = CaptureSession::from_columns(read_columns(capture_path)?)?;
    let calculator = MetricCalculator::new(config);
    let report = SessionReport::build(capture_path, &calculator, &session, Metric::P1, Metric::P0dot2)?;

    print!("{}", Reporter::new(OutputFormat::Console).format_report(&report)?);
    Ok(())
}
