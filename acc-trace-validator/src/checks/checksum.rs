//! Brake message checksum validation
//!
//! Pairs each pressure sample with the checksum decoded at the exact same
//! timestamp and compares the checksum against a pluggable algorithm. The
//! shipped algorithm is [`EchoChecksum`], where the expected checksum equals
//! the pressure value itself.

use super::{Violation, ViolationResult};
use crate::series::SignalSeries;
use crate::types::DecodedSample;
use std::collections::HashMap;

pub const NAME: &str = "Checksum Validation";

/// Maps a pressure value to its expected checksum
pub trait ChecksumAlgorithm {
    fn expected(&self, value: i64) -> i64;
}

/// Expected checksum equals the value
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoChecksum;

impl ChecksumAlgorithm for EchoChecksum {
    fn expected(&self, value: i64) -> i64 {
        value
    }
}

impl<F> ChecksumAlgorithm for F
where
    F: Fn(i64) -> i64,
{
    fn expected(&self, value: i64) -> i64 {
        self(value)
    }
}

/// Validate checksums with [`EchoChecksum`]
pub fn check_checksum(
    samples: &[DecodedSample],
    pressure_signal: &str,
    checksum_signal: &str,
) -> ViolationResult {
    check_checksum_with(samples, pressure_signal, checksum_signal, &EchoChecksum)
}

/// Validate checksums with a custom algorithm
///
/// Pressure and checksum samples are inner-joined on their exact timestamp.
/// Repeated timestamps pair every combination, in pressure order. Values are
/// truncated toward zero before comparison.
pub fn check_checksum_with<A: ChecksumAlgorithm + ?Sized>(
    samples: &[DecodedSample],
    pressure_signal: &str,
    checksum_signal: &str,
    algorithm: &A,
) -> ViolationResult {
    let pressure = SignalSeries::from_samples(samples, pressure_signal).numeric();
    let checksum = SignalSeries::from_samples(samples, checksum_signal).numeric();

    if pressure.is_empty() || checksum.is_empty() {
        return ViolationResult::pass(NAME, "No brake checksum data available for validation");
    }

    let mut by_timestamp: HashMap<u64, Vec<f64>> = HashMap::new();
    for &(t, c) in &checksum {
        by_timestamp.entry(t.to_bits()).or_default().push(c);
    }

    let mut details = Vec::new();
    let mut timestamps = Vec::new();

    for &(t, p) in &pressure {
        let Some(matches) = by_timestamp.get(&t.to_bits()) else {
            continue;
        };
        for &c in matches {
            let pressure_value = p as i64;
            let checksum_value = c as i64;
            let expected = algorithm.expected(pressure_value);
            if checksum_value != expected {
                details.push(Violation::Checksum {
                    timestamp: t,
                    pressure: pressure_value,
                    checksum: checksum_value,
                    expected,
                });
                timestamps.push(t);
            }
        }
    }

    if details.is_empty() {
        return ViolationResult::pass(NAME, "All brake message checksums valid");
    }

    ViolationResult::fail(
        NAME,
        format!("Checksum errors detected: {} invalid messages", details.len()),
        details,
        timestamps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalValue;

    fn brake_frame(timestamp: f64, pressure: f64, checksum: f64) -> Vec<DecodedSample> {
        [("BrakePressure", pressure), ("BrakeChecksum", checksum)]
            .iter()
            .map(|&(name, v)| DecodedSample {
                timestamp,
                message_name: "BrakeSystem".to_string(),
                can_id: 0x102,
                signal_name: name.to_string(),
                value: SignalValue::Numeric(v),
                raw_data: Vec::new(),
                truncated: false,
            })
            .collect()
    }

    #[test]
    fn test_matching_checksum_passes() {
        let samples = brake_frame(0.0, 150.0, 150.0);
        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");
        assert!(result.passed);
        assert_eq!(result.message, "All brake message checksums valid");
    }

    #[test]
    fn test_mismatch_reported() {
        let samples = brake_frame(0.0, 150.0, 99.0);
        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");

        assert!(!result.passed);
        assert_eq!(
            result.details,
            vec![Violation::Checksum {
                timestamp: 0.0,
                pressure: 150,
                checksum: 99,
                expected: 150,
            }]
        );
        assert_eq!(result.timestamps, vec![0.0]);
    }

    #[test]
    fn test_values_truncated_before_compare() {
        let samples = brake_frame(1.0, 150.7, 150.2);
        assert!(check_checksum(&samples, "BrakePressure", "BrakeChecksum").passed);
    }

    #[test]
    fn test_unpaired_timestamps_ignored() {
        let mut samples = brake_frame(0.0, 10.0, 10.0);
        samples.truncate(1);
        samples.extend(brake_frame(1.0, 20.0, 99.0).into_iter().skip(1));
        assert!(check_checksum(&samples, "BrakePressure", "BrakeChecksum").passed);
    }

    #[test]
    fn test_missing_series_passes() {
        let mut samples = brake_frame(0.0, 150.0, 99.0);
        samples.truncate(1);
        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");
        assert!(result.passed);
        assert!(result.message.contains("No brake checksum data"));
    }

    #[test]
    fn test_long_trace_pairs_every_frame() {
        let n = 40_000;
        let mut samples = Vec::with_capacity(2 * n);
        for i in 0..n {
            let t = i as f64 * 0.01;
            let checksum = if i % 1000 == 999 { 1.0 } else { (i % 300) as f64 };
            samples.extend(brake_frame(t, (i % 300) as f64, checksum));
        }

        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");
        assert!(!result.passed);
        assert_eq!(result.details.len(), n / 1000);
        assert_eq!(result.timestamps[0], 999.0 * 0.01);
    }

    #[test]
    fn test_duplicate_timestamps_pair_every_combination() {
        let mut samples = brake_frame(0.5, 10.0, 10.0);
        samples.extend(brake_frame(0.5, 20.0, 30.0));

        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");
        let pairs: Vec<(i64, i64)> = result
            .details
            .iter()
            .map(|v| match v {
                Violation::Checksum { pressure, checksum, .. } => (*pressure, *checksum),
                other => panic!("unexpected violation {:?}", other),
            })
            .collect();
        assert_eq!(pairs, vec![(10, 30), (20, 10), (20, 30)]);
    }

    #[test]
    fn test_custom_algorithm() {
        let samples = brake_frame(0.0, 150.0, 105.0);
        let xor = |v: i64| v ^ 0xFF;
        let result = check_checksum_with(&samples, "BrakePressure", "BrakeChecksum", &xor);
        assert!(result.passed);

        let result = check_checksum(&samples, "BrakePressure", "BrakeChecksum");
        assert!(!result.passed);
    }
}
