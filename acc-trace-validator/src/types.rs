//! Core types for the ACC trace validator
//!
//! This module defines the fundamental data model shared by the decoder and the
//! violation checks: raw frames as read from a trace, decoded samples, and the
//! error taxonomy. Everything here is plain data; no type carries behaviour that
//! depends on a loaded database.

use std::fmt;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Message name attached to samples whose frame id is not in the database
pub const UNKNOWN_MESSAGE: &str = "UNKNOWN";

/// Message name attached to samples produced by a failed decode
pub const ERROR_MESSAGE: &str = "ERROR";

/// Signal name of the placeholder sample emitted for an unknown frame
pub const RAW_SIGNAL: &str = "raw";

/// Signal name of the sample emitted for a failed decode
pub const DECODE_ERROR_SIGNAL: &str = "decode_error";

/// Raw CAN frame from a trace
///
/// Timestamps are seconds relative to the start of the measurement. A trace is
/// not guaranteed to be ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Timestamp in seconds
    pub timestamp: f64,
    /// CAN message ID (11-bit or 29-bit, extended flag stripped)
    pub can_id: u32,
    /// Frame data bytes (0-8 bytes for classic CAN)
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(timestamp: f64, can_id: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            can_id,
            data: data.into(),
        }
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur while loading databases or reading traces
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("Failed to load signal database: {0}")]
    DatabaseLoadError(String),

    #[error("Duplicate frame id in signal database: 0x{0:X}")]
    DuplicateFrameId(u32),

    #[error("Signals '{first}' and '{second}' overlap in message '{message}'")]
    OverlappingSignals {
        message: String,
        first: String,
        second: String,
    },

    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("Signal not found: {0}")]
    UnknownSignal(String),

    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ValidatorError {
    /// True for every error that means the signal database cannot be used
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            ValidatorError::DatabaseLoadError(_)
                | ValidatorError::DuplicateFrameId(_)
                | ValidatorError::OverlappingSignals { .. }
                | ValidatorError::InvalidSignalDefinition(_)
        )
    }
}

/// Why a single frame could not be turned into physical values
///
/// Neither outcome is fatal: ingestion records both as samples and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeOutcome {
    #[error("Unknown frame: CAN ID 0x{0:X}")]
    UnknownFrame(u32),

    #[error("Failed to decode signal '{signal}': {reason}")]
    DecodeError { signal: String, reason: String },
}

/// Value carried by a decoded sample
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Physical value after scaling and offset
    Numeric(f64),
    /// No value could be produced (unknown frame)
    Unavailable,
    /// Text of a decode failure
    ErrorText(String),
}

impl SignalValue {
    /// Numeric view of the value; `None` for anything that is not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Numeric(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Numeric(v) => write!(f, "{:.3}", v),
            SignalValue::Unavailable => write!(f, "n/a"),
            SignalValue::ErrorText(e) => write!(f, "error: {}", e),
        }
    }
}

/// One signal value at one point in time, as produced by trace ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    /// Timestamp of the frame this sample came from (seconds)
    pub timestamp: f64,
    /// Message name from the database, or `UNKNOWN` / `ERROR`
    pub message_name: String,
    /// CAN message ID of the source frame
    pub can_id: u32,
    /// Signal name, or `raw` / `decode_error`
    pub signal_name: String,
    /// Decoded value
    pub value: SignalValue,
    /// Raw frame payload, kept for audit
    pub raw_data: Vec<u8>,
    /// True if the payload was shorter than the signal layout and missing bits
    /// were read as zero
    pub truncated: bool,
}

impl DecodedSample {
    /// True for samples that came from a successfully decoded message
    pub fn is_decoded(&self) -> bool {
        self.message_name != UNKNOWN_MESSAGE && self.message_name != ERROR_MESSAGE
    }

    /// Lowercase hex rendering of the raw payload
    pub fn raw_hex(&self) -> String {
        self.raw_data.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
