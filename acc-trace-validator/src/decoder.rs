//! Trace ingestion
//!
//! Turns a sequence of raw frames into decoded samples. Every frame produces
//! at least one sample: decoded messages yield one sample per signal, unknown
//! ids and failed decodes yield a single labelled placeholder. Ingestion never
//! fails and never reorders frames.

use crate::message_decoder::decode;
use crate::signals::SignalDatabase;
use crate::types::{
    DecodeOutcome, DecodedSample, RawFrame, SignalValue, DECODE_ERROR_SIGNAL, ERROR_MESSAGE,
    RAW_SIGNAL, UNKNOWN_MESSAGE,
};
use std::collections::VecDeque;

/// Decode every frame and collect the samples in frame-arrival order
pub fn ingest<I>(frames: I, database: &SignalDatabase) -> Vec<DecodedSample>
where
    I: IntoIterator<Item = RawFrame>,
{
    let samples: Vec<DecodedSample> = DecodingIterator::new(frames.into_iter(), database).collect();
    log::info!("Ingested trace: {} decoded samples", samples.len());
    samples
}

/// Decode a single frame into its samples
pub fn decode_frame(frame: &RawFrame, database: &SignalDatabase) -> Vec<DecodedSample> {
    let sample = |message_name: &str, signal_name: &str, value: SignalValue, truncated: bool| {
        DecodedSample {
            timestamp: frame.timestamp,
            message_name: message_name.to_string(),
            can_id: frame.can_id,
            signal_name: signal_name.to_string(),
            value,
            raw_data: frame.data.clone(),
            truncated,
        }
    };

    match decode(frame.can_id, &frame.data, database) {
        Ok(message) => message
            .signals
            .into_iter()
            .map(|signal| {
                sample(
                    &message.message_name,
                    &signal.name,
                    SignalValue::Numeric(signal.value),
                    message.truncated,
                )
            })
            .collect(),
        Err(DecodeOutcome::UnknownFrame(can_id)) => {
            log::trace!("Unknown CAN ID: 0x{:X} at {:.6}s", can_id, frame.timestamp);
            vec![sample(UNKNOWN_MESSAGE, RAW_SIGNAL, SignalValue::Unavailable, false)]
        }
        Err(outcome) => {
            log::warn!(
                "Decode error for CAN ID 0x{:X} at {:.6}s: {}",
                frame.can_id,
                frame.timestamp,
                outcome
            );
            vec![sample(
                ERROR_MESSAGE,
                DECODE_ERROR_SIGNAL,
                SignalValue::ErrorText(outcome.to_string()),
                false,
            )]
        }
    }
}

/// Iterator that decodes frames into samples lazily
///
/// Use this instead of [`ingest`] to stream very large traces without holding
/// every sample in memory.
pub struct DecodingIterator<'a, I>
where
    I: Iterator<Item = RawFrame>,
{
    frame_iter: I,
    database: &'a SignalDatabase,
    pending_samples: VecDeque<DecodedSample>,
}

impl<'a, I> DecodingIterator<'a, I>
where
    I: Iterator<Item = RawFrame>,
{
    pub fn new(frame_iter: I, database: &'a SignalDatabase) -> Self {
        Self {
            frame_iter,
            database,
            pending_samples: VecDeque::new(),
        }
    }
}

impl<'a, I> Iterator for DecodingIterator<'a, I>
where
    I: Iterator<Item = RawFrame>,
{
    type Item = DecodedSample;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sample) = self.pending_samples.pop_front() {
                return Some(sample);
            }
            let frame = self.frame_iter.next()?;
            self.pending_samples
                .extend(decode_frame(&frame, self.database));
        }
    }
}
