//! ACC Trace Validator Library
//!
//! Validates CAN bus traces recorded from a vehicle running Adaptive Cruise
//! Control against a DBC signal database and a battery of safety checks.
//!
//! # Architecture
//!
//! The pipeline is linear and stateless:
//! - Load signal definitions from a DBC file into a [`SignalDatabase`]
//! - Read raw frames from a trace (Vector ASC is supported)
//! - Decode every frame bit-exactly into [`DecodedSample`]s
//! - Run the five checks (overspeed, message timeout, emergency stop, signal
//!   bounds, brake checksum) over the samples
//! - Aggregate the per-check results into a [`Summary`]
//!
//! Reporting, exit codes and parallel execution live in the application layer
//! (acc-trace-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use acc_trace_validator::{read_asc_file, validate, SignalDatabase, ValidatorConfig};
//! use std::path::Path;
//!
//! let database = SignalDatabase::load(Path::new("acc_signals.dbc")).unwrap();
//! let frames = read_asc_file(Path::new("sample_can_log.asc")).unwrap();
//!
//! let config = ValidatorConfig::new().with_overspeed_threshold(120.0);
//! let summary = validate(frames, &database, &config);
//!
//! for result in &summary.results {
//!     println!("{}", result);
//! }
//! println!("Pass rate: {:.1}%", summary.pass_rate);
//! ```

pub mod checks;
pub mod config;
pub mod decoder;
pub mod formats;
pub mod message_decoder;
pub mod message_encoder;
pub mod series;
pub mod signals;
pub mod summary;
pub mod types;

// Re-export main types for convenience
pub use checks::{run_all_checks, CheckKind, Violation, ViolationResult};
pub use config::ValidatorConfig;
pub use decoder::{decode_frame, ingest, DecodingIterator};
pub use formats::{parse_asc_line, read_asc_file, AscParser};
pub use message_decoder::decode;
pub use message_encoder::encode_message;
pub use series::{message_intervals, message_timeseries, SignalSeries};
pub use signals::{DatabaseStats, SignalDatabase};
pub use summary::{summarize, Summary};
pub use types::{
    DecodeOutcome, DecodedSample, RawFrame, Result, SignalValue, ValidatorError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ingest a trace, run every check and summarise the results
pub fn validate<I>(frames: I, database: &SignalDatabase, config: &ValidatorConfig) -> Summary
where
    I: IntoIterator<Item = RawFrame>,
{
    let samples = ingest(frames, database);
    summarize(&run_all_checks(&samples, database, config))
}
