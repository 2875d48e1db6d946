//! Message timeout (silence) detection

use super::{Violation, ViolationResult};
use crate::series::unique_timestamps;
use crate::types::DecodedSample;

pub const NAME: &str = "Message Timeout Detection";

/// Flag every gap between consecutive distinct timestamps longer than `timeout`
///
/// With `message_name` set only that message's samples are considered.
/// Passes when fewer than two distinct timestamps remain.
pub fn check_timeout(
    samples: &[DecodedSample],
    timeout: f64,
    message_name: Option<&str>,
) -> ViolationResult {
    if samples.is_empty() {
        return ViolationResult::fail(NAME, "No data available for analysis", Vec::new(), Vec::new());
    }

    let in_scope: Vec<&DecodedSample> = samples
        .iter()
        .filter(|s| message_name.map_or(true, |name| s.message_name == name))
        .collect();
    if in_scope.is_empty() {
        return ViolationResult::fail(NAME, "No message data found in log", Vec::new(), Vec::new());
    }

    let timestamps = unique_timestamps(in_scope);
    if timestamps.len() < 2 {
        return ViolationResult::pass(NAME, "Insufficient data to check timeouts");
    }

    let gaps: Vec<(f64, f64)> = timestamps
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(start, end)| end - start > timeout)
        .collect();

    if gaps.is_empty() {
        return ViolationResult::pass(
            NAME,
            format!("No message timeouts detected (threshold: {}s)", timeout),
        );
    }

    let max_gap = gaps
        .iter()
        .map(|(start, end)| end - start)
        .fold(f64::NEG_INFINITY, f64::max);

    let details = gaps
        .iter()
        .map(|&(start_time, end_time)| Violation::Timeout {
            start_time,
            end_time,
            gap_duration: end_time - start_time,
            threshold: timeout,
        })
        .collect();
    let violation_timestamps = gaps.iter().map(|(start, _)| *start).collect();

    ViolationResult::fail(
        NAME,
        format!(
            "Message timeout detected: {} gaps, max {:.2}s",
            gaps.len(),
            max_gap
        ),
        details,
        violation_timestamps,
    )
}
