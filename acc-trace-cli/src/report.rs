//! Report generation
//!
//! Renders the validation summary as plain text for the terminal and writes
//! the JSON artifact.

use acc_trace_validator::{DatabaseStats, Summary, Violation};
use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::Path;

const RULE: &str = "═══════════════════════════════════════════════";

/// Inputs and intermediate counts shown in the report header
pub struct RunInfo<'a> {
    pub log: &'a Path,
    pub dbc: &'a Path,
    pub database: DatabaseStats,
    pub frames: usize,
    pub samples: usize,
}

/// Text report for one run
///
/// Formatting errors from the sink propagate out of `fmt`.
pub struct TextReport<'a> {
    pub info: &'a RunInfo<'a>,
    pub summary: &'a Summary,
    pub details: bool,
    pub min_pass_rate: f64,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info;
        let summary = self.summary;

        writeln!(f, "{}", RULE)?;
        writeln!(f, "  ACC Trace Validation")?;
        writeln!(f, "{}\n", RULE)?;
        writeln!(f, "  Log file: {}", info.log.display())?;
        writeln!(f, "  DBC file: {}", info.dbc.display())?;
        writeln!(
            f,
            "  Database: {} messages, {} signals ({} bounded)",
            info.database.num_messages, info.database.num_signals, info.database.num_bounded_signals
        )?;
        writeln!(
            f,
            "  Trace:    {} frames, {} decoded samples\n",
            info.frames, info.samples
        )?;

        for result in &summary.results {
            let status = if result.passed { "✓ PASS" } else { "✗ FAIL" };
            writeln!(f, "  {}: {}", status, result.name)?;
            writeln!(f, "          {}", result.message)?;
            if !result.passed && !result.details.is_empty() {
                writeln!(f, "          Violations: {}", result.details.len())?;
                if self.details {
                    for violation in &result.details {
                        writeln!(f, "            - {}", describe(violation))?;
                    }
                }
            }
        }

        writeln!(f, "\n{}", RULE)?;
        writeln!(
            f,
            "  Checks:    {}/{} passed ({:.0}%)",
            summary.passed, summary.total, summary.pass_rate
        )?;
        writeln!(f, "  Timestamp: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        if summary.pass_rate >= self.min_pass_rate {
            writeln!(f, "  Validation criteria met")?;
        } else {
            writeln!(
                f,
                "  Pass rate below {:.0}%, review the failed checks",
                self.min_pass_rate
            )?;
        }
        writeln!(f, "{}", RULE)
    }
}

/// Render the text report
pub fn render_text(info: &RunInfo<'_>, summary: &Summary, details: bool, min_pass_rate: f64) -> String {
    TextReport {
        info,
        summary,
        details,
        min_pass_rate,
    }
    .to_string()
}

/// One-line description of a violation
pub fn describe(violation: &Violation) -> String {
    match violation {
        Violation::Overspeed {
            timestamp, speed, excess, ..
        } => format!("{:.3}s: {:.1} km/h ({:.1} over)", timestamp, speed, excess),
        Violation::Timeout {
            start_time,
            end_time,
            gap_duration,
            ..
        } => format!(
            "{:.3}s → {:.3}s: silent for {:.2}s",
            start_time, end_time, gap_duration
        ),
        Violation::EmergencyStop {
            timestamp,
            brake_pressure,
            deceleration,
            ..
        } => format!(
            "{:.3}s: brake {:.1} bar, deceleration {:.1} km/h/s",
            timestamp, brake_pressure, deceleration
        ),
        Violation::Bounds {
            timestamp,
            signal,
            value,
            min,
            max,
            message,
        } => format!(
            "{:.3}s: {}.{} = {} outside [{}, {}]",
            timestamp,
            message,
            signal,
            value,
            bound(*min),
            bound(*max)
        ),
        Violation::Checksum {
            timestamp,
            pressure,
            checksum,
            expected,
        } => format!(
            "{:.3}s: pressure {} checksum {} (expected {})",
            timestamp, pressure, checksum, expected
        ),
    }
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Write the JSON summary
pub fn write_json(summary: &Summary, path: &Path) -> Result<()> {
    let json = summary
        .to_json_pretty()
        .context("Failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write JSON summary: {:?}", path))?;
    log::info!("Wrote JSON summary to {:?}", path);
    Ok(())
}
