//! Violation checks
//!
//! Five independent, stateless checks over the decoded samples. Each returns a
//! [`ViolationResult`]; none of them mutates the samples or depends on another
//! check's output, so they may run in any order or concurrently.

pub mod bounds;
pub mod checksum;
pub mod emergency_stop;
pub mod overspeed;
pub mod timeout;

pub use bounds::check_signal_bounds;
pub use checksum::{check_checksum, check_checksum_with, ChecksumAlgorithm, EchoChecksum};
pub use emergency_stop::check_emergency_stop;
pub use overspeed::check_overspeed;
pub use timeout::check_timeout;

use crate::config::ValidatorConfig;
use crate::signals::SignalDatabase;
use crate::types::DecodedSample;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// One recorded violation; the shape depends on the check that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Violation {
    Overspeed {
        timestamp: f64,
        speed: f64,
        threshold: f64,
        excess: f64,
    },
    Timeout {
        start_time: f64,
        end_time: f64,
        gap_duration: f64,
        threshold: f64,
    },
    EmergencyStop {
        timestamp: f64,
        brake_pressure: f64,
        deceleration: f64,
        brake_threshold: f64,
        decel_threshold: f64,
    },
    Bounds {
        timestamp: f64,
        signal: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        message: String,
    },
    Checksum {
        timestamp: f64,
        pressure: i64,
        checksum: i64,
        expected: i64,
    },
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationResult {
    /// Human-readable check name
    pub name: String,
    /// True if the check found nothing to report
    pub passed: bool,
    /// One-line summary
    pub message: String,
    /// Violations in the order they were found
    pub details: Vec<Violation>,
    /// Timestamps of the violations, for correlating with plots
    pub timestamps: Vec<f64>,
}

impl ViolationResult {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.into(),
            details: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    pub fn fail(
        name: &str,
        message: impl Into<String>,
        details: Vec<Violation>,
        timestamps: Vec<f64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.into(),
            details,
            timestamps,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.timestamps.len()
    }
}

impl Serialize for ViolationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ViolationResult", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("passed", &self.passed)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("details", &self.details)?;
        state.serialize_field("violation_count", &self.violation_count())?;
        state.serialize_field("timestamps", &self.timestamps)?;
        state.end()
    }
}

impl fmt::Display for ViolationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "{}: {} - {}", status, self.name, self.message)
    }
}

/// The checks, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Overspeed,
    Timeout,
    EmergencyStop,
    SignalBounds,
    Checksum,
}

impl CheckKind {
    /// All checks in their fixed reporting order
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Overspeed,
        CheckKind::Timeout,
        CheckKind::EmergencyStop,
        CheckKind::SignalBounds,
        CheckKind::Checksum,
    ];

    /// Run this check
    pub fn run(
        self,
        samples: &[DecodedSample],
        database: &SignalDatabase,
        config: &ValidatorConfig,
    ) -> ViolationResult {
        log::debug!("Running check: {:?}", self);
        let result = match self {
            CheckKind::Overspeed => {
                check_overspeed(samples, &config.speed_signal, config.overspeed_threshold)
            }
            CheckKind::Timeout => check_timeout(
                samples,
                config.timeout_seconds,
                config.timeout_message.as_deref(),
            ),
            CheckKind::EmergencyStop => check_emergency_stop(samples, config),
            CheckKind::SignalBounds => check_signal_bounds(samples, database),
            CheckKind::Checksum => {
                check_checksum(samples, &config.brake_signal, &config.checksum_signal)
            }
        };
        log::debug!("{}", result);
        result
    }
}

/// Run every check in the fixed order
pub fn run_all_checks(
    samples: &[DecodedSample],
    database: &SignalDatabase,
    config: &ValidatorConfig,
) -> Vec<ViolationResult> {
    CheckKind::ALL
        .iter()
        .map(|check| check.run(samples, database, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serialization_includes_violation_count() {
        let result = ViolationResult::fail(
            overspeed::NAME,
            "Overspeed detected",
            vec![Violation::Overspeed {
                timestamp: 1.0,
                speed: 150.0,
                threshold: 100.0,
                excess: 50.0,
            }],
            vec![1.0],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["violation_count"], 1);
        assert_eq!(json["details"][0]["excess"], 50.0);
        assert_eq!(json["passed"], false);
    }

    #[test]
    fn test_violation_serializes_without_variant_tag() {
        let json = serde_json::to_value(Violation::Timeout {
            start_time: 1.0,
            end_time: 6.0,
            gap_duration: 5.0,
            threshold: 2.0,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start_time": 1.0,
                "end_time": 6.0,
                "gap_duration": 5.0,
                "threshold": 2.0,
            })
        );
    }

    #[test]
    fn test_run_all_checks_order_on_empty_input() {
        let results = run_all_checks(&[], &SignalDatabase::new(), &ValidatorConfig::default());
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                overspeed::NAME,
                timeout::NAME,
                emergency_stop::NAME,
                bounds::NAME,
                checksum::NAME
            ]
        );
        // Missing speed and missing timestamps fail; the rest pass
        let passed: Vec<bool> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, vec![false, false, true, true, true]);
    }
}
