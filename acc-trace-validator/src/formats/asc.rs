//! Vector ASC (ASCII) trace reader
//!
//! Data lines look like:
//!
//! ```text
//! 0.010000 1  101             Rx   d 8 E8 03 00 00 00 00 00 00
//! ```
//!
//! i.e. `timestamp channel id Tx|Rx d dlc byte...`. Header lines (`date`,
//! `base`, `internal events`, `Begin/End Triggerblock`, `Start of measurement`),
//! comments and anything else that does not match are skipped.

use crate::types::{RawFrame, Result, ValidatorError};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

const HEADER_PREFIXES: [&str; 6] = ["date", "base", "internal", "Begin", "End", "//"];

/// Parse one line of an ASC trace
///
/// Returns `None` for header, comment and malformed lines. The payload is cut
/// to the declared DLC; an `x` suffix on the id (extended frame) is dropped.
pub fn parse_asc_line(line: &str) -> Option<RawFrame> {
    let line = line.trim();
    if line.is_empty()
        || HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
        || line.contains("Start of")
    {
        return None;
    }

    let mut tokens = line.split_whitespace();

    let timestamp = parse_timestamp(tokens.next()?)?;
    let channel = tokens.next()?;
    if !channel.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let id_token = tokens.next()?;
    let id_hex = id_token
        .strip_suffix('x')
        .or_else(|| id_token.strip_suffix('X'))
        .unwrap_or(id_token);
    let can_id = u32::from_str_radix(id_hex, 16).ok()?;

    if !matches!(tokens.next()?, "Tx" | "Rx") {
        return None;
    }
    if tokens.next()? != "d" {
        return None;
    }
    let dlc: usize = tokens.next()?.parse().ok()?;

    let data: Vec<u8> = tokens
        .take_while(|t| t.len() == 2)
        .map_while(|t| u8::from_str_radix(t, 16).ok())
        .take(dlc)
        .collect();

    Some(RawFrame::new(timestamp, can_id, data))
}

fn parse_timestamp(token: &str) -> Option<f64> {
    let well_formed = token.starts_with(|c: char| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !well_formed {
        return None;
    }
    token.parse().ok()
}

/// ASC trace parser
pub struct AscParser;

impl AscParser {
    /// Open an ASC trace and return a lazy iterator over its frames
    pub fn parse(path: &Path) -> Result<AscFrameIterator> {
        log::info!("Parsing ASC file: {:?}", path);

        if !path.exists() {
            return Err(ValidatorError::LogParseError(format!(
                "ASC file not found: {:?}",
                path
            )));
        }

        let file = File::open(path).map_err(|e| {
            ValidatorError::LogParseError(format!("Failed to open ASC file: {}", e))
        })?;

        Ok(AscFrameIterator {
            lines: BufReader::new(file).lines(),
            line_number: 0,
            skipped: 0,
        })
    }
}

/// Iterator over the frames of an ASC trace
///
/// Yields frames in file order. Lines that are not valid UTF-8 are skipped like
/// any other unparseable line; only genuine read failures surface as errors.
pub struct AscFrameIterator {
    lines: Lines<BufReader<File>>,
    line_number: usize,
    skipped: usize,
}

impl AscFrameIterator {
    /// Number of non-frame lines skipped so far
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }
}

impl Iterator for AscFrameIterator {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    self.line_number += 1;
                    self.skipped += 1;
                    continue;
                }
                Err(e) => return Some(Err(ValidatorError::IoError(e))),
            };
            self.line_number += 1;

            match parse_asc_line(&line) {
                Some(frame) => return Some(Ok(frame)),
                None => {
                    self.skipped += 1;
                    log::trace!("Skipping ASC line {}: {}", self.line_number, line.trim());
                }
            }
        }
    }
}

/// Read every frame of an ASC trace into memory
pub fn read_asc_file(path: &Path) -> Result<Vec<RawFrame>> {
    let frames = AscParser::parse(path)?.collect::<Result<Vec<_>>>()?;
    log::info!("Read {} frames from {:?}", frames.len(), path);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_data_line() {
        let frame = parse_asc_line("0.010000 1  101             Rx   d 2 E8 03").unwrap();
        assert_eq!(frame.timestamp, 0.01);
        assert_eq!(frame.can_id, 0x101);
        assert_eq!(frame.data, vec![0xE8, 0x03]);
    }

    #[test]
    fn test_payload_cut_to_dlc() {
        let frame = parse_asc_line("1.5 1 102 Tx d 2 00 D2 00 63").unwrap();
        assert_eq!(frame.data, vec![0x00, 0xD2]);
        assert_eq!(frame.dlc(), 2);
    }

    #[test]
    fn test_trailing_fields_ignored() {
        let frame =
            parse_asc_line("2.0 1 100 Rx d 1 64 Length = 0 BitCount = 0 ID = 256").unwrap();
        assert_eq!(frame.data, vec![0x64]);
    }

    #[test]
    fn test_extended_id_suffix_stripped() {
        let frame = parse_asc_line("0.5 1 18FEF100x Rx d 1 FF").unwrap();
        assert_eq!(frame.can_id, 0x18FE_F100);
    }

    #[test]
    fn test_non_data_lines_skipped() {
        for line in [
            "",
            "date Mon Jan 1 00:00:00 2024",
            "base hex  timestamps absolute",
            "internal events logged",
            "Begin Triggerblock Mon Jan 1 00:00:00 2024",
            "   0.000000 Start of measurement",
            "End TriggerBlock",
            "// a comment",
            "0.5 1 101 Rx r",
            "abc 1 101 Rx d 1 00",
            "-1.0 1 101 Rx d 1 00",
            "0.5 1 ZZZ Rx d 1 00",
        ] {
            assert!(parse_asc_line(line).is_none(), "accepted {:?}", line);
        }
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date Mon Jan 1 00:00:00 2024").unwrap();
        writeln!(file, "base hex  timestamps absolute").unwrap();
        writeln!(file, "Begin Triggerblock").unwrap();
        writeln!(file, "   0.000000 Start of measurement").unwrap();
        writeln!(file, "   0.000000 1  101  Rx   d 2 40 1F").unwrap();
        writeln!(file, "   1.000000 1  100  Rx   d 1 64").unwrap();
        writeln!(file, "End TriggerBlock").unwrap();
        file.flush().unwrap();

        let mut iter = AscParser::parse(file.path()).unwrap();
        let frames: Vec<RawFrame> = iter.by_ref().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].can_id, 0x101);
        assert_eq!(frames[1].timestamp, 1.0);
        assert_eq!(iter.skipped_lines(), 5);

        assert_eq!(read_asc_file(file.path()).unwrap(), frames);
    }

    #[test]
    fn test_missing_file() {
        let err = AscParser::parse(Path::new("/nonexistent/trace.asc")).err().unwrap();
        assert!(matches!(err, ValidatorError::LogParseError(_)));
    }
}
