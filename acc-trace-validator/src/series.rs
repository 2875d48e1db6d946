//! Signal time series
//!
//! Views over decoded samples: per-signal series sorted by time, per-message
//! rows, and frame intervals. All functions borrow the samples and never
//! modify them.

use crate::types::{DecodedSample, RawFrame, SignalValue};
use std::collections::BTreeMap;

/// Time-ordered values of one signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    /// Signal name
    pub name: String,
    /// (timestamp, value) pairs, ascending by timestamp; ties keep input order
    pub points: Vec<(f64, SignalValue)>,
}

impl SignalSeries {
    /// Collect every sample of `signal_name` and sort it by timestamp
    pub fn from_samples(samples: &[DecodedSample], signal_name: &str) -> Self {
        let mut points: Vec<(f64, SignalValue)> = samples
            .iter()
            .filter(|s| s.signal_name == signal_name)
            .map(|s| (s.timestamp, s.value.clone()))
            .collect();
        // Stable sort keeps arrival order for equal timestamps
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self {
            name: signal_name.to_string(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Numeric points only; unavailable and error values are skipped
    pub fn numeric(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|(t, v)| v.as_f64().map(|v| (*t, v)))
            .collect()
    }

    /// Minimum and maximum numeric value, if any
    pub fn range(&self) -> Option<(f64, f64)> {
        self.numeric().into_iter().fold(None, |acc, (_, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// One timestamp's worth of a message's signals
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub timestamp: f64,
    /// Signal name -> value; the first sample at a timestamp wins
    pub values: BTreeMap<String, SignalValue>,
}

/// Group the samples of one message into rows keyed by timestamp
///
/// Rows are ascending by timestamp. Returns an empty vector if the message
/// never appears.
pub fn message_timeseries(samples: &[DecodedSample], message_name: &str) -> Vec<MessageRow> {
    let mut rows: Vec<MessageRow> = Vec::new();
    let mut sorted: Vec<&DecodedSample> = samples
        .iter()
        .filter(|s| s.message_name == message_name)
        .collect();
    sorted.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    for sample in sorted {
        match rows.last_mut() {
            Some(row) if row.timestamp == sample.timestamp => {
                row.values
                    .entry(sample.signal_name.clone())
                    .or_insert_with(|| sample.value.clone());
            }
            _ => {
                let mut values = BTreeMap::new();
                values.insert(sample.signal_name.clone(), sample.value.clone());
                rows.push(MessageRow {
                    timestamp: sample.timestamp,
                    values,
                });
            }
        }
    }

    rows
}

/// Gaps between consecutive frames carrying `can_id`, in time order
///
/// Empty if the id appears fewer than twice.
pub fn message_intervals(frames: &[RawFrame], can_id: u32) -> Vec<f64> {
    let mut timestamps: Vec<f64> = frames
        .iter()
        .filter(|f| f.can_id == can_id)
        .map(|f| f.timestamp)
        .collect();
    timestamps.sort_by(f64::total_cmp);

    timestamps.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sorted, de-duplicated timestamps of the given samples
pub fn unique_timestamps<'a>(samples: impl IntoIterator<Item = &'a DecodedSample>) -> Vec<f64> {
    let mut timestamps: Vec<f64> = samples.into_iter().map(|s| s.timestamp).collect();
    timestamps.sort_by(f64::total_cmp);
    timestamps.dedup();
    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: f64, message: &str, signal: &str, value: SignalValue) -> DecodedSample {
        DecodedSample {
            timestamp,
            message_name: message.to_string(),
            can_id: 0x101,
            signal_name: signal.to_string(),
            value,
            raw_data: Vec::new(),
            truncated: false,
        }
    }

    #[test]
    fn test_series_sorted_with_stable_ties() {
        let samples = vec![
            sample(2.0, "VehicleSpeed", "Speed", SignalValue::Numeric(90.0)),
            sample(1.0, "VehicleSpeed", "Speed", SignalValue::Numeric(150.0)),
            sample(1.0, "VehicleSpeed", "Speed", SignalValue::Numeric(151.0)),
            sample(0.0, "Brake", "BrakePressure", SignalValue::Numeric(5.0)),
            sample(0.0, "VehicleSpeed", "Speed", SignalValue::Unavailable),
        ];
        let series = SignalSeries::from_samples(&samples, "Speed");
        assert_eq!(series.len(), 4);
        assert_eq!(series.points[0], (0.0, SignalValue::Unavailable));
        assert_eq!(series.points[1], (1.0, SignalValue::Numeric(150.0)));
        assert_eq!(series.points[2], (1.0, SignalValue::Numeric(151.0)));
        assert_eq!(series.numeric(), vec![(1.0, 150.0), (1.0, 151.0), (2.0, 90.0)]);
        assert_eq!(series.range(), Some((90.0, 151.0)));
    }

    #[test]
    fn test_missing_signal_is_empty() {
        let series = SignalSeries::from_samples(&[], "Speed");
        assert!(series.is_empty());
        assert_eq!(series.range(), None);
    }

    #[test]
    fn test_message_timeseries_first_value_wins() {
        let samples = vec![
            sample(1.0, "BrakeSystem", "BrakePressure", SignalValue::Numeric(210.0)),
            sample(1.0, "BrakeSystem", "BrakeChecksum", SignalValue::Numeric(210.0)),
            sample(0.5, "BrakeSystem", "BrakePressure", SignalValue::Numeric(10.0)),
            sample(1.0, "BrakeSystem", "BrakePressure", SignalValue::Numeric(999.0)),
        ];
        let rows = message_timeseries(&samples, "BrakeSystem");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, 0.5);
        assert_eq!(rows[1].values.len(), 2);
        assert_eq!(rows[1].values["BrakePressure"], SignalValue::Numeric(210.0));
        assert!(message_timeseries(&samples, "Throttle").is_empty());
    }

    #[test]
    fn test_message_intervals() {
        let frames = vec![
            RawFrame::new(0.2, 0x101, vec![]),
            RawFrame::new(0.0, 0x101, vec![]),
            RawFrame::new(0.1, 0x102, vec![]),
            RawFrame::new(0.5, 0x101, vec![]),
        ];
        let intervals = message_intervals(&frames, 0x101);
        assert_eq!(intervals.len(), 2);
        assert!((intervals[0] - 0.2).abs() < 1e-12);
        assert!((intervals[1] - 0.3).abs() < 1e-12);
        assert!(message_intervals(&frames, 0x102).is_empty());
    }

    #[test]
    fn test_unique_timestamps() {
        let samples = vec![
            sample(1.0, "A", "x", SignalValue::Unavailable),
            sample(0.0, "A", "y", SignalValue::Unavailable),
            sample(1.0, "A", "z", SignalValue::Unavailable),
        ];
        assert_eq!(unique_timestamps(&samples), vec![0.0, 1.0]);
    }
}
