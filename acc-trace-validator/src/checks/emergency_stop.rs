//! Emergency stop detection
//!
//! Correlates hard braking with rapid deceleration. A failed result means an
//! emergency stop occurred in the trace; each violation characterises one
//! braking sample that coincides with deceleration above the threshold.

use super::{Violation, ViolationResult};
use crate::config::ValidatorConfig;
use crate::series::SignalSeries;
use crate::types::DecodedSample;

pub const NAME: &str = "Emergency Stop Detection";

/// Deceleration estimate for each speed point: `-(Δspeed / Δt)` against the
/// previous point
///
/// The first point has no estimate, nor does a point sharing its timestamp
/// with its predecessor. Input must be sorted by timestamp.
pub fn deceleration(speed: &[(f64, f64)]) -> Vec<Option<f64>> {
    let mut estimates = Vec::with_capacity(speed.len());
    if speed.is_empty() {
        return estimates;
    }

    estimates.push(None);
    for pair in speed.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        let dt = t1 - t0;
        estimates.push(if dt > 0.0 { Some(-(v1 - v0) / dt) } else { None });
    }
    estimates
}

/// Find brake samples above the brake threshold that coincide with
/// deceleration above the decel threshold
///
/// For each such brake sample the maximum deceleration estimate among speed
/// points within `correlation_window` seconds (inclusive) is compared with
/// the threshold. Passes when either series has no numeric data.
pub fn check_emergency_stop(samples: &[DecodedSample], config: &ValidatorConfig) -> ViolationResult {
    let speed = SignalSeries::from_samples(samples, &config.speed_signal).numeric();
    let brake = SignalSeries::from_samples(samples, &config.brake_signal).numeric();

    if speed.is_empty() || brake.is_empty() {
        return ViolationResult::pass(NAME, "Insufficient speed or brake data for analysis");
    }

    let decel = deceleration(&speed);
    let window = config.correlation_window;

    let mut details = Vec::new();
    let mut timestamps = Vec::new();

    for &(t, pressure) in brake.iter().filter(|(_, p)| *p > config.brake_threshold) {
        let lo = speed.partition_point(|(ts, _)| *ts < t - window);
        let hi = speed.partition_point(|(ts, _)| *ts <= t + window);
        let max_decel = decel[lo..hi.max(lo)]
            .iter()
            .filter_map(|d| *d)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))));

        if let Some(max_decel) = max_decel.filter(|d| *d > config.decel_threshold) {
            details.push(Violation::EmergencyStop {
                timestamp: t,
                brake_pressure: pressure,
                deceleration: max_decel,
                brake_threshold: config.brake_threshold,
                decel_threshold: config.decel_threshold,
            });
            timestamps.push(t);
        }
    }

    if details.is_empty() {
        return ViolationResult::pass(NAME, "No emergency stop events detected");
    }

    ViolationResult::fail(
        NAME,
        format!("Emergency stop detected: {} events", details.len()),
        details,
        timestamps,
    )
}
