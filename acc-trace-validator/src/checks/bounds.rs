//! Signal bounds validation

use super::{Violation, ViolationResult};
use crate::signals::SignalDatabase;
use crate::types::DecodedSample;
use std::collections::HashSet;

pub const NAME: &str = "Signal Bounds Validation";

/// Flag every numeric sample outside the physical range its DBC declares
///
/// Signals without a declared range, unknown frames and non-numeric values are
/// skipped. Passes vacuously when nothing bounded was decoded.
pub fn check_signal_bounds(samples: &[DecodedSample], database: &SignalDatabase) -> ViolationResult {
    let mut details = Vec::new();
    let mut timestamps = Vec::new();
    let mut seen = HashSet::new();

    for sample in samples {
        let Some(signal) = database.get_signal(sample.can_id, &sample.signal_name) else {
            continue;
        };
        let Some(value) = sample.value.as_f64() else {
            continue;
        };
        if !signal.is_out_of_bounds(value) {
            continue;
        }

        details.push(Violation::Bounds {
            timestamp: sample.timestamp,
            signal: sample.signal_name.clone(),
            value,
            min: signal.min,
            max: signal.max,
            message: sample.message_name.clone(),
        });
        if seen.insert(sample.timestamp.to_bits()) {
            timestamps.push(sample.timestamp);
        }
    }

    if details.is_empty() {
        return ViolationResult::pass(NAME, "All signal values within DBC-defined bounds");
    }

    ViolationResult::fail(
        NAME,
        format!("Out-of-bounds violations: {} signals", details.len()),
        details,
        timestamps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::database::{ByteOrder, MessageDefinition, SignalDefinition, ValueType};
    use crate::types::SignalValue;

    fn database() -> SignalDatabase {
        let sig = |name: &str, start_bit: u16, max: Option<f64>| SignalDefinition {
            name: name.to_string(),
            start_bit,
            length: 8,
            byte_order: ByteOrder::LittleEndian,
            value_type: ValueType::Unsigned,
            factor: 1.0,
            offset: 0.0,
            min: max.map(|_| 0.0),
            max,
            unit: None,
        };
        let mut db = SignalDatabase::new();
        db.add_message(MessageDefinition {
            id: 0x101,
            name: "VehicleSpeed".to_string(),
            size: 8,
            sender: None,
            signals: vec![sig("Speed", 0, Some(120.0)), sig("Counter", 8, None)],
            source: "test".to_string(),
        })
        .unwrap();
        db
    }

    fn sample(timestamp: f64, signal: &str, value: SignalValue) -> DecodedSample {
        DecodedSample {
            timestamp,
            message_name: "VehicleSpeed".to_string(),
            can_id: 0x101,
            signal_name: signal.to_string(),
            value,
            raw_data: Vec::new(),
            truncated: false,
        }
    }

    #[test]
    fn test_value_above_max() {
        let samples = vec![
            sample(1.0, "Speed", SignalValue::Numeric(100.0)),
            sample(2.0, "Speed", SignalValue::Numeric(130.0)),
            sample(2.0, "Counter", SignalValue::Numeric(255.0)),
        ];
        let result = check_signal_bounds(&samples, &database());

        assert!(!result.passed);
        assert_eq!(
            result.details,
            vec![Violation::Bounds {
                timestamp: 2.0,
                signal: "Speed".to_string(),
                value: 130.0,
                min: Some(0.0),
                max: Some(120.0),
                message: "VehicleSpeed".to_string(),
            }]
        );
        assert_eq!(result.timestamps, vec![2.0]);
    }

    #[test]
    fn test_timestamps_deduplicated() {
        let mut db = database();
        db.add_message(MessageDefinition {
            id: 0x102,
            name: "Other".to_string(),
            size: 8,
            sender: None,
            signals: vec![SignalDefinition {
                name: "Level".to_string(),
                start_bit: 0,
                length: 8,
                byte_order: ByteOrder::LittleEndian,
                value_type: ValueType::Unsigned,
                factor: 1.0,
                offset: 0.0,
                min: Some(10.0),
                max: None,
                unit: None,
            }],
            source: "test".to_string(),
        })
        .unwrap();

        let mut low = sample(3.0, "Level", SignalValue::Numeric(5.0));
        low.can_id = 0x102;
        let samples = vec![sample(3.0, "Speed", SignalValue::Numeric(200.0)), low];

        let result = check_signal_bounds(&samples, &db);
        assert_eq!(result.details.len(), 2);
        assert_eq!(result.timestamps, vec![3.0]);
    }

    #[test]
    fn test_non_numeric_and_unbounded_skipped() {
        let samples = vec![
            sample(1.0, "Speed", SignalValue::Unavailable),
            sample(1.0, "Speed", SignalValue::ErrorText("bad".into())),
            sample(1.0, "Counter", SignalValue::Numeric(1e6)),
        ];
        let result = check_signal_bounds(&samples, &database());
        assert!(result.passed);
        assert!(check_signal_bounds(&[], &database()).passed);
    }
}
