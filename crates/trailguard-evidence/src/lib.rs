//! Evidence adapters: read configuration snapshots and audit record exports.
//!
//! This crate is allowed to do filesystem IO. It never talks to a database;
//! evidence arrives as files produced by the collector scripts.

#![forbid(unsafe_code)]

mod records;
mod snapshot;

use anyhow::Context;
use camino::Utf8Path;
use std::fs::File;
use std::io::BufReader;
use trailguard_domain::VerifyError;
use trailguard_domain::model::{AuditRecord, ConfigurationSnapshot};

pub use records::{JsonlRecords, RecordFormat, TsvRecords, parse_jsonl_record};
pub use snapshot::{TIMESTAMP_KEY, parse_snapshot};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text as a configuration snapshot.
    ///
    /// **Never panics** on any input.
    pub fn parse_snapshot_text(text: &str) -> Result<(), VerifyError> {
        let _ = snapshot::parse_snapshot(text)?;
        Ok(())
    }

    /// Stream arbitrary bytes through the record reader for `format`.
    ///
    /// Returns the number of records read before the first error.
    /// **Never panics** on any input.
    pub fn parse_records(bytes: &[u8], format: RecordFormat) -> Result<usize, VerifyError> {
        let mut count = 0;
        for record in RecordStream::from_reader(bytes, format) {
            record?;
            count += 1;
        }
        Ok(count)
    }
}

/// Read and parse a snapshot file.
pub fn read_snapshot(path: &Utf8Path) -> anyhow::Result<ConfigurationSnapshot> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            VerifyError::input(format!("snapshot {path} is not valid UTF-8"))
        } else {
            VerifyError::io(format!("read snapshot {path}"), e)
        }
    })?;
    let snapshot =
        snapshot::parse_snapshot(&text).with_context(|| format!("parse snapshot {path}"))?;
    tracing::debug!(path = %path, variables = snapshot.len(), "snapshot loaded");
    Ok(snapshot)
}

/// A lazily-read audit export of either format.
pub enum RecordStream<R> {
    Jsonl(JsonlRecords<R>),
    Tsv(TsvRecords<R>),
}

impl<R: std::io::BufRead> RecordStream<R> {
    pub fn from_reader(reader: R, format: RecordFormat) -> Self {
        match format {
            RecordFormat::Jsonl => RecordStream::Jsonl(JsonlRecords::new(reader)),
            RecordFormat::Tsv => RecordStream::Tsv(TsvRecords::new(reader)),
        }
    }
}

impl<R: std::io::BufRead> Iterator for RecordStream<R> {
    type Item = Result<AuditRecord, VerifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RecordStream::Jsonl(r) => r.next(),
            RecordStream::Tsv(r) => r.next(),
        }
    }
}

/// Open an audit export for streaming.
///
/// `format` wins; otherwise it is inferred from the extension and defaults to JSON Lines.
/// The file handle is released when the stream is dropped.
pub fn open_records(
    path: &Utf8Path,
    format: Option<RecordFormat>,
) -> anyhow::Result<RecordStream<BufReader<File>>> {
    let format = format
        .or_else(|| RecordFormat::from_extension(path.extension()))
        .unwrap_or(RecordFormat::Jsonl);
    let file = File::open(path).map_err(|e| VerifyError::io(format!("open records {path}"), e))?;
    tracing::debug!(path = %path, ?format, "streaming audit records");
    Ok(RecordStream::from_reader(BufReader::new(file), format))
}
