//! DBC file parser
//!
//! Parses Vector DBC files and converts them into our internal signal database format.

use crate::signals::database::{ByteOrder, MessageDefinition, SignalDefinition, ValueType};
use crate::types::{Result, ValidatorError};
use std::path::Path;

/// Flag bit used by DBC files to mark 29-bit identifiers
const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Parse a DBC file and return message definitions
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDefinition>> {
    log::info!("Parsing DBC file: {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| {
        ValidatorError::DatabaseLoadError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    let source_filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc")
        .to_string();

    let messages = parse_dbc_bytes(&bytes, &source_filename)?;

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Parse DBC content already held in memory
///
/// `source` is recorded on every message as its origin.
pub fn parse_dbc_bytes(bytes: &[u8], source: &str) -> Result<Vec<MessageDefinition>> {
    // Try UTF-8 first, then fallback to Latin-1/Windows-1252 encoding
    let dbc_content = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::warn!("DBC file {} is not UTF-8, trying Latin-1 encoding", source);
            bytes.iter().map(|&b| b as char).collect()
        }
    };

    let dbc = can_dbc::DBC::from_slice(dbc_content.as_bytes()).map_err(|e| {
        ValidatorError::DatabaseLoadError(format!("Failed to parse DBC file {}: {:?}", source, e))
    })?;

    dbc.messages()
        .iter()
        .map(|dbc_msg| convert_message(dbc_msg, source))
        .collect()
}

/// Convert a can-dbc message to our MessageDefinition
fn convert_message(dbc_msg: &can_dbc::Message, source: &str) -> Result<MessageDefinition> {
    let signals = dbc_msg
        .signals()
        .iter()
        .map(convert_signal)
        .collect::<Result<Vec<_>>>()?;

    Ok(MessageDefinition {
        id: dbc_msg.message_id().0 & !EXTENDED_ID_FLAG,
        name: dbc_msg.message_name().to_string(),
        size: *dbc_msg.message_size() as usize,
        sender: match dbc_msg.transmitter() {
            can_dbc::Transmitter::NodeName(name) => Some(name.to_string()),
            _ => None,
        },
        signals,
        source: source.to_string(),
    })
}

/// Convert a can-dbc signal to our SignalDefinition
fn convert_signal(dbc_sig: &can_dbc::Signal) -> Result<SignalDefinition> {
    if !matches!(
        dbc_sig.multiplexer_indicator(),
        can_dbc::MultiplexIndicator::Plain
    ) {
        return Err(ValidatorError::InvalidSignalDefinition(format!(
            "Multiplexed signal '{}' is not supported",
            dbc_sig.name()
        )));
    }

    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let value_type = match *dbc_sig.value_type() {
        can_dbc::ValueType::Signed => ValueType::Signed,
        can_dbc::ValueType::Unsigned => ValueType::Unsigned,
    };

    // A [0|0] range is the DBC convention for "no range declared"
    let (min, max) = match (*dbc_sig.min(), *dbc_sig.max()) {
        (min, max) if min == 0.0 && max == 0.0 => (None, None),
        (min, max) => (Some(min), Some(max)),
    };

    let start_bit = u16::try_from(*dbc_sig.start_bit()).map_err(|_| {
        ValidatorError::InvalidSignalDefinition(format!(
            "Signal '{}' start bit {} is out of range",
            dbc_sig.name(),
            dbc_sig.start_bit()
        ))
    })?;
    let length = u16::try_from(*dbc_sig.signal_size()).map_err(|_| {
        ValidatorError::InvalidSignalDefinition(format!(
            "Signal '{}' length {} is out of range",
            dbc_sig.name(),
            dbc_sig.signal_size()
        ))
    })?;

    Ok(SignalDefinition {
        name: dbc_sig.name().to_string(),
        start_bit,
        length,
        byte_order,
        value_type,
        factor: *dbc_sig.factor(),
        offset: *dbc_sig.offset(),
        min,
        max,
        unit: if dbc_sig.unit().is_empty() {
            None
        } else {
            Some(dbc_sig.unit().to_string())
        },
    })
}
