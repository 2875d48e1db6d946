//! Overspeed detection

use super::{Violation, ViolationResult};
use crate::series::SignalSeries;
use crate::types::DecodedSample;

pub const NAME: &str = "Overspeed Detection";

/// Flag every speed sample strictly above `threshold`
///
/// Fails when no speed data exists at all.
pub fn check_overspeed(
    samples: &[DecodedSample],
    speed_signal: &str,
    threshold: f64,
) -> ViolationResult {
    if samples.is_empty() {
        return ViolationResult::fail(NAME, "No data available for analysis", Vec::new(), Vec::new());
    }

    let speed = SignalSeries::from_samples(samples, speed_signal).numeric();
    if speed.is_empty() {
        return ViolationResult::fail(
            NAME,
            "No speed signal data found in log",
            Vec::new(),
            Vec::new(),
        );
    }

    let violations: Vec<(f64, f64)> = speed.into_iter().filter(|(_, v)| *v > threshold).collect();

    if violations.is_empty() {
        return ViolationResult::pass(
            NAME,
            format!("No violations above threshold ({} km/h)", threshold),
        );
    }

    let max_speed = violations
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);

    let details = violations
        .iter()
        .map(|&(timestamp, speed)| Violation::Overspeed {
            timestamp,
            speed,
            threshold,
            excess: speed - threshold,
        })
        .collect();
    let timestamps = violations.iter().map(|(t, _)| *t).collect();

    ViolationResult::fail(
        NAME,
        format!(
            "Overspeed detected: {} violations, max {:.1} km/h",
            violations.len(),
            max_speed
        ),
        details,
        timestamps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalValue;

    fn speed_samples(points: &[(f64, f64)]) -> Vec<DecodedSample> {
        points
            .iter()
            .map(|&(timestamp, v)| DecodedSample {
                timestamp,
                message_name: "VehicleSpeed".to_string(),
                can_id: 0x101,
                signal_name: "Speed".to_string(),
                value: SignalValue::Numeric(v),
                raw_data: Vec::new(),
                truncated: false,
            })
            .collect()
    }

    #[test]
    fn test_single_overspeed_violation() {
        let samples = speed_samples(&[(0.0, 50.0), (1.0, 150.0), (2.0, 90.0)]);
        let result = check_overspeed(&samples, "Speed", 100.0);

        assert!(!result.passed);
        assert_eq!(result.timestamps, vec![1.0]);
        assert_eq!(
            result.details,
            vec![Violation::Overspeed {
                timestamp: 1.0,
                speed: 150.0,
                threshold: 100.0,
                excess: 50.0,
            }]
        );
        assert!(result.message.contains("1 violations"));
        assert!(result.message.contains("150.0"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let samples = speed_samples(&[(0.0, 100.0), (1.0, 99.9)]);
        let result = check_overspeed(&samples, "Speed", 100.0);
        assert!(result.passed);
        assert!(result.message.contains("No violations above threshold"));
    }

    #[test]
    fn test_empty_and_missing_signal_fail() {
        assert!(!check_overspeed(&[], "Speed", 100.0).passed);

        let mut samples = speed_samples(&[(0.0, 50.0), (1.0, 60.0)]);
        for s in &mut samples {
            s.signal_name = "WrongSignal".to_string();
        }
        let result = check_overspeed(&samples, "Speed", 100.0);
        assert!(!result.passed);
        assert!(result.details.is_empty());
    }
}
