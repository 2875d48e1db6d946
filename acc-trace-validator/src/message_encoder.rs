//! Message encoding
//!
//! The inverse of the message decoder: packs physical values into a frame
//! payload using the same bit layout, so `decode(encode(v))` reproduces `v`
//! up to the resolution of the signal's factor.

use crate::signals::database::{MessageDefinition, SignalDefinition, ValueType};
use crate::types::{Result, ValidatorError};

/// Convert a physical value to the raw bits stored in the frame
///
/// physical = raw * factor + offset, so raw = (physical - offset) / factor,
/// rounded to the nearest integer. Values outside the representable range of
/// the signal are rejected.
pub fn compute_raw_value(physical: f64, signal: &SignalDefinition) -> Result<u64> {
    let raw = ((physical - signal.offset) / signal.factor).round();
    let length = signal.length as u32;

    let (lo, hi) = match signal.value_type {
        ValueType::Unsigned => (0.0, 2f64.powi(length as i32) - 1.0),
        ValueType::Signed => {
            let half = 2f64.powi(length as i32 - 1);
            (-half, half - 1.0)
        }
    };
    if !raw.is_finite() || raw < lo || raw > hi {
        return Err(ValidatorError::InvalidSignalDefinition(format!(
            "Value {} does not fit signal '{}' ({} bits)",
            physical, signal.name, length
        )));
    }

    let bits = match signal.value_type {
        ValueType::Unsigned => raw as u64,
        ValueType::Signed => raw as i64 as u64,
    };
    Ok(if length >= 64 {
        bits
    } else {
        bits & ((1u64 << length) - 1)
    })
}

/// Write the raw bits of one signal into `data`, clearing the target bits first
///
/// `data` must be long enough for the signal layout.
pub fn pack_signal(data: &mut [u8], signal: &SignalDefinition, raw: u64) -> Result<()> {
    let payload_len = data.len();
    for (pos, value_bit) in signal.bit_positions() {
        let byte = data.get_mut(pos / 8).ok_or_else(|| {
            ValidatorError::InvalidSignalDefinition(format!(
                "Signal '{}' does not fit a {}-byte payload",
                signal.name, payload_len
            ))
        })?;
        let bit = ((raw >> value_bit) & 0x01) as u8;
        *byte &= !(1u8 << (pos % 8));
        *byte |= bit << (pos % 8);
    }
    Ok(())
}

/// Encode a full message from signal name/value pairs
///
/// Unspecified signals are left as zero. The payload is `message.size` bytes
/// long. Fails if a signal name is not part of the message.
pub fn encode_message(message: &MessageDefinition, values: &[(&str, f64)]) -> Result<Vec<u8>> {
    let mut data = vec![0u8; message.size];

    for (signal_name, physical) in values {
        let signal = message
            .signal(signal_name)
            .ok_or_else(|| ValidatorError::UnknownSignal(signal_name.to_string()))?;
        let raw = compute_raw_value(*physical, signal)?;
        pack_signal(&mut data, signal, raw)?;
    }

    Ok(data)
}
