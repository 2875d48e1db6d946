//! Trace file readers
//!
//! Each reader exposes an iterator over raw frames.

pub mod asc;

pub use asc::{parse_asc_line, read_asc_file, AscFrameIterator, AscParser};
