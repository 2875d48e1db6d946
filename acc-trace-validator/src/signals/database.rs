//! Signal database
//!
//! Holds the message and signal layouts loaded from a DBC file. The database is
//! validated as messages are added and is read-only once loading completes.

use crate::types::{Result, ValidatorError};
use std::collections::HashMap;
use std::path::Path;

/// Highest payload size (in bits) a signal may reach into
pub const MAX_PAYLOAD_BITS: usize = 64;

/// A complete CAN message definition
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    /// CAN message ID
    pub id: u32,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub size: usize,
    /// Sender ECU name (optional)
    pub sender: Option<String>,
    /// All signals in this message, in declaration order
    pub signals: Vec<SignalDefinition>,
    /// Source file (DBC filename)
    pub source: String,
}

impl MessageDefinition {
    /// Find a signal of this message by name
    pub fn signal(&self, name: &str) -> Option<&SignalDefinition> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit in the CAN frame (LSB for Intel, MSB for Motorola, DBC numbering)
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    /// Byte order
    pub byte_order: ByteOrder,
    /// Value type (signed/unsigned)
    pub value_type: ValueType,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Minimum physical value (None = unbounded)
    pub min: Option<f64>,
    /// Maximum physical value (None = unbounded)
    pub max: Option<f64>,
    /// Engineering unit (e.g., "km/h", "bar")
    pub unit: Option<String>,
}

impl SignalDefinition {
    /// Payload bit positions covered by this signal, paired with the bit of the
    /// raw value each one carries.
    ///
    /// Positions use DBC numbering: bit `n` is bit `n % 8` (LSB = 0) of byte
    /// `n / 8`. Intel signals walk upward from the LSB at `start_bit`. Motorola
    /// signals start at the MSB and walk downward within a byte, continuing at
    /// bit 7 of the next byte.
    pub fn bit_positions(&self) -> Vec<(usize, usize)> {
        let length = self.length as usize;
        let mut positions = Vec::with_capacity(length);

        match self.byte_order {
            ByteOrder::LittleEndian => {
                let start = self.start_bit as usize;
                for i in 0..length {
                    positions.push((start + i, i));
                }
            }
            ByteOrder::BigEndian => {
                let mut pos = self.start_bit as usize;
                for i in 0..length {
                    positions.push((pos, length - 1 - i));
                    pos = if pos % 8 == 0 { pos + 15 } else { pos - 1 };
                }
            }
        }

        positions
    }

    /// Number of payload bytes needed to hold every bit of this signal
    pub fn required_bytes(&self) -> usize {
        self.bit_positions()
            .iter()
            .map(|(pos, _)| pos / 8 + 1)
            .max()
            .unwrap_or(0)
    }

    /// True if the signal declares a lower or upper physical bound
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// True if `value` lies outside the declared physical range
    pub fn is_out_of_bounds(&self, value: f64) -> bool {
        self.min.map_or(false, |min| value < min) || self.max.map_or(false, |max| value > max)
    }

    /// Bitmask of the payload bits this signal occupies
    fn footprint(&self) -> u64 {
        self.bit_positions()
            .iter()
            .fold(0u64, |mask, (pos, _)| mask | (1u64 << pos))
    }

    /// Check the layout for problems that would make decoding meaningless
    fn validate(&self) -> Result<()> {
        if self.length == 0 || self.length as usize > MAX_PAYLOAD_BITS {
            return Err(ValidatorError::InvalidSignalDefinition(format!(
                "Signal '{}' has length {} (must be 1..=64)",
                self.name, self.length
            )));
        }
        if !self.factor.is_finite() || self.factor == 0.0 || !self.offset.is_finite() {
            return Err(ValidatorError::InvalidSignalDefinition(format!(
                "Signal '{}' has unusable scaling ({}, {})",
                self.name, self.factor, self.offset
            )));
        }
        if let Some((pos, _)) = self
            .bit_positions()
            .into_iter()
            .find(|(pos, _)| *pos >= MAX_PAYLOAD_BITS)
        {
            return Err(ValidatorError::InvalidSignalDefinition(format!(
                "Signal '{}' reaches bit {} beyond an 8-byte payload",
                self.name, pos
            )));
        }
        Ok(())
    }
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Signed integer (two's complement over the signal length)
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// The signal database, keyed by frame id
#[derive(Debug, Clone, Default)]
pub struct SignalDatabase {
    /// All message definitions by CAN ID
    messages: HashMap<u32, MessageDefinition>,

    /// Signal name lookup
    /// Key: Signal name, Value: CAN IDs of the messages carrying it
    signal_lookup: HashMap<String, Vec<u32>>,
}

impl SignalDatabase {
    /// Create a new empty signal database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a DBC file into a new database
    ///
    /// Fails if the file is missing or unparseable, if two messages share a
    /// frame id, or if signals within one message overlap.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading signal database: {:?}", path);

        let messages = crate::signals::dbc::parse_dbc_file(path)?;

        let mut db = Self::new();
        for message in messages {
            db.add_message(message)?;
        }

        let stats = db.stats();
        log::info!(
            "Signal database loaded: {} messages, {} signals ({} bounded)",
            stats.num_messages,
            stats.num_signals,
            stats.num_bounded_signals
        );
        Ok(db)
    }

    /// Add a message definition to the database
    ///
    /// The message is rejected (and the database left unchanged) if its id is
    /// already taken, if any signal layout is invalid, or if two of its signals
    /// share a payload bit.
    pub fn add_message(&mut self, message: MessageDefinition) -> Result<()> {
        if self.messages.contains_key(&message.id) {
            return Err(ValidatorError::DuplicateFrameId(message.id));
        }

        let mut footprints: Vec<(&str, u64)> = Vec::with_capacity(message.signals.len());
        for signal in &message.signals {
            signal.validate()?;
            let mask = signal.footprint();
            if let Some((other, _)) = footprints.iter().find(|(_, m)| m & mask != 0) {
                return Err(ValidatorError::OverlappingSignals {
                    message: message.name.clone(),
                    first: other.to_string(),
                    second: signal.name.clone(),
                });
            }
            footprints.push((signal.name.as_str(), mask));
        }

        for signal in &message.signals {
            self.signal_lookup
                .entry(signal.name.clone())
                .or_default()
                .push(message.id);
        }

        self.messages.insert(message.id, message);
        Ok(())
    }

    /// Get the message definition for a CAN ID
    pub fn get_message(&self, can_id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&can_id)
    }

    /// Get a signal definition by CAN ID and signal name
    pub fn get_signal(&self, can_id: u32, signal_name: &str) -> Option<&SignalDefinition> {
        self.get_message(can_id).and_then(|msg| msg.signal(signal_name))
    }

    /// Find all messages containing a specific signal name
    pub fn find_signal(&self, signal_name: &str) -> Vec<(u32, &SignalDefinition)> {
        self.signal_lookup
            .get(signal_name)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.get_signal(*id, signal_name).map(|sig| (*id, sig)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All message definitions, ordered by CAN ID
    pub fn messages(&self) -> Vec<&MessageDefinition> {
        let mut messages: Vec<&MessageDefinition> = self.messages.values().collect();
        messages.sort_unstable_by_key(|m| m.id);
        messages
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        let signals = self.messages.values().flat_map(|msg| msg.signals.iter());
        let (num_signals, num_bounded_signals) = signals.fold((0, 0), |(all, bounded), sig| {
            (all + 1, bounded + usize::from(sig.is_bounded()))
        });

        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals,
            num_bounded_signals,
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
    /// Signals with a declared min and/or max
    pub num_bounded_signals: usize,
}
