//! Message Decoding Engine
//!
//! Extracts signal values from raw CAN frames based on signal definitions
//! from the signal database. Handles bit extraction, endianness, sign extension
//! and physical value conversion.

use crate::signals::database::{MessageDefinition, SignalDatabase, SignalDefinition, ValueType};
use crate::types::DecodeOutcome;

/// A single decoded signal value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignal {
    /// Signal name from the DBC
    pub name: String,
    /// Physical value (raw * factor + offset)
    pub value: f64,
    /// Raw value after sign extension
    pub raw_value: i64,
}

/// All signals decoded from one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// Message name from the DBC
    pub message_name: String,
    /// Signals in declaration order
    pub signals: Vec<DecodedSignal>,
    /// True if the payload was too short for at least one signal; missing bits
    /// were read as zero
    pub truncated: bool,
}

impl DecodedMessage {
    /// Physical value of a signal by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.signals.iter().find(|s| s.name == name).map(|s| s.value)
    }
}

/// Decode a frame payload using the database
///
/// Returns `UnknownFrame` if the id has no message definition.
pub fn decode(
    can_id: u32,
    data: &[u8],
    database: &SignalDatabase,
) -> Result<DecodedMessage, DecodeOutcome> {
    let message_def = database
        .get_message(can_id)
        .ok_or(DecodeOutcome::UnknownFrame(can_id))?;
    MessageDecoder::decode_message(data, message_def)
}

/// Message decoder - extracts signals from CAN frames
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode every signal of a message from a frame payload
    ///
    /// A payload shorter than a signal's layout is zero-padded and the result
    /// is marked `truncated`; every signal is still emitted. The first signal
    /// that cannot be decoded aborts the frame with `DecodeError`.
    pub fn decode_message(
        data: &[u8],
        message_def: &MessageDefinition,
    ) -> Result<DecodedMessage, DecodeOutcome> {
        let mut signals = Vec::with_capacity(message_def.signals.len());
        let mut truncated = false;

        for signal in &message_def.signals {
            let (decoded, complete) = Self::decode_signal(data, signal)?;
            if !complete {
                log::warn!(
                    "Signal '{}' requires {} bytes but frame only has {} bytes",
                    signal.name,
                    signal.required_bytes(),
                    data.len()
                );
                truncated = true;
            }
            signals.push(decoded);
        }

        Ok(DecodedMessage {
            message_name: message_def.name.clone(),
            signals,
            truncated,
        })
    }

    /// Decode a single signal, reporting whether every bit was present
    fn decode_signal(
        data: &[u8],
        signal: &SignalDefinition,
    ) -> Result<(DecodedSignal, bool), DecodeOutcome> {
        let length = signal.length as usize;
        if length == 0 || length > 64 {
            return Err(Self::error(signal, format!("invalid bit length {}", length)));
        }
        if signal.bit_positions().iter().any(|(pos, _)| *pos >= 64) {
            return Err(Self::error(signal, "bit range exceeds 64-bit payload"));
        }

        let (raw, complete) = Self::extract_raw(data, signal);

        let raw_value = match signal.value_type {
            ValueType::Unsigned => raw as i64,
            ValueType::Signed => Self::sign_extend(raw, length),
        };
        let raw_physical = match signal.value_type {
            ValueType::Unsigned => raw as f64,
            ValueType::Signed => raw_value as f64,
        };

        let value = raw_physical * signal.factor + signal.offset;
        if !value.is_finite() {
            return Err(Self::error(signal, "physical value is not finite"));
        }

        Ok((
            DecodedSignal {
                name: signal.name.clone(),
                value,
                raw_value,
            },
            complete,
        ))
    }

    /// Extract the unsigned raw bits of a signal
    ///
    /// Bits past the end of `data` read as zero; the flag is false if any were
    /// missing.
    fn extract_raw(data: &[u8], signal: &SignalDefinition) -> (u64, bool) {
        let mut result: u64 = 0;
        let mut complete = true;

        for (pos, value_bit) in signal.bit_positions() {
            match data.get(pos / 8) {
                Some(byte) => {
                    let bit = (byte >> (pos % 8)) & 0x01;
                    result |= (bit as u64) << value_bit;
                }
                None => complete = false,
            }
        }

        (result, complete)
    }

    /// Sign-extend a value from N bits to 64 bits
    fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }

    fn error(signal: &SignalDefinition, reason: impl Into<String>) -> DecodeOutcome {
        DecodeOutcome::DecodeError {
            signal: signal.name.clone(),
            reason: reason.into(),
        }
    }
}
