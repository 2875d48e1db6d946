//! Signal database and DBC parser
//!
//! This module contains the DBC descriptor loader and the signal database it
//! populates.

pub mod database;
pub mod dbc;

// Re-export key types for convenience
pub use database::{
    ByteOrder, DatabaseStats, MessageDefinition, SignalDatabase, SignalDefinition, ValueType,
};
