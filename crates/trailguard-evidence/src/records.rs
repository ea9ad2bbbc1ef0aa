//! Streaming readers for audit trail exports.
//!
//! Both readers pull one line at a time from a `BufRead` and yield
//! `Result<AuditRecord, VerifyError>`, so the chain verifier can stop reading
//! as soon as it finds a break.

use serde::Deserialize;
use std::io::{BufRead, Lines};
use trailguard_domain::VerifyError;
use trailguard_domain::model::{AuditRecord, HashBytes};

/// On-disk layout of an audit export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFormat {
    /// One JSON object per line.
    Jsonl,
    /// Tab-separated values with a header row (`mysql --batch` output).
    Tsv,
}

impl RecordFormat {
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        match ext?.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" | "json" => Some(RecordFormat::Jsonl),
            "tsv" | "tab" => Some(RecordFormat::Tsv),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "jsonl" => Some(RecordFormat::Jsonl),
            "tsv" => Some(RecordFormat::Tsv),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "sequenceId", alias = "sequence_id", alias = "id")]
    sequence_id: u64,
    #[serde(
        default,
        rename = "previousHash",
        alias = "previous_hash",
        alias = "prev_hash",
        alias = "ph"
    )]
    previous_hash: Option<String>,
    #[serde(
        rename = "currentHash",
        alias = "current_hash",
        alias = "curr_hash",
        alias = "ch"
    )]
    current_hash: String,
    #[serde(default, rename = "tableName", alias = "table_name")]
    table_name: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

fn at_line(line_no: usize, err: VerifyError) -> VerifyError {
    match err {
        VerifyError::Input(msg) => VerifyError::input(format!("line {line_no}: {msg}")),
        other => other,
    }
}

/// Undecodable bytes are malformed evidence, not a failing source.
fn line_read_error(line_no: usize, err: std::io::Error) -> VerifyError {
    if err.kind() == std::io::ErrorKind::InvalidData {
        VerifyError::input(format!("line {line_no}: invalid UTF-8"))
    } else {
        VerifyError::io(format!("read audit record line {line_no}"), err)
    }
}

/// Parse one JSON Lines record.
pub fn parse_jsonl_record(line: &str) -> Result<AuditRecord, VerifyError> {
    let raw: RawRecord = serde_json::from_str(line)
        .map_err(|e| VerifyError::input(format!("malformed audit record: {e}")))?;
    Ok(AuditRecord {
        sequence_id: raw.sequence_id,
        previous_hash: match raw.previous_hash.as_deref() {
            Some(h) => HashBytes::from_hex(h)?,
            None => HashBytes::sentinel(),
        },
        current_hash: HashBytes::from_hex(&raw.current_hash)?,
        table_name: raw.table_name,
        action: raw.action,
    })
}

/// JSON Lines reader. Blank lines are skipped.
pub struct JsonlRecords<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> JsonlRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonlRecords<R> {
    type Item = Result<AuditRecord, VerifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_no += 1;
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(line_read_error(self.line_no, e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_jsonl_record(&line).map_err(|e| at_line(self.line_no, e)));
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct TsvColumns {
    id: usize,
    previous: usize,
    current: usize,
    table_name: Option<usize>,
    action: Option<usize>,
}

/// `HEX(prev_hash)` -> `prev_hash`, `` `id` `` -> `id`, case-folded.
fn normalize_header(cell: &str) -> String {
    let mut name = cell.trim().trim_matches('`').to_ascii_lowercase();
    if let Some(inner) = name.strip_prefix("hex(").and_then(|s| s.strip_suffix(')')) {
        name = inner.trim().trim_matches('`').to_string();
    }
    name
}

impl TsvColumns {
    fn from_header(header: &str) -> Result<Self, VerifyError> {
        let mut id = None;
        let mut previous = None;
        let mut current = None;
        let mut table_name = None;
        let mut action = None;
        for (i, cell) in header.split('\t').enumerate() {
            let slot = match normalize_header(cell).as_str() {
                "id" | "sequence_id" | "sequenceid" => &mut id,
                "prev_hash" | "previous_hash" | "previoushash" | "ph" => &mut previous,
                "curr_hash" | "current_hash" | "currenthash" | "ch" => &mut current,
                "table_name" | "tablename" => &mut table_name,
                "action" => &mut action,
                _ => continue,
            };
            slot.get_or_insert(i);
        }
        let require = |col: Option<usize>, name: &str| {
            col.ok_or_else(|| {
                VerifyError::input(format!("TSV header is missing a {name} column"))
            })
        };
        Ok(Self {
            id: require(id, "sequence id")?,
            previous: require(previous, "previous hash")?,
            current: require(current, "current hash")?,
            table_name,
            action,
        })
    }

    fn parse_row(&self, row: &str) -> Result<AuditRecord, VerifyError> {
        let cells: Vec<&str> = row.split('\t').collect();
        let optional = |i: Option<usize>| -> Result<Option<String>, VerifyError> {
            match i {
                Some(i) => Ok(cell(&cells, i)?.map(str::to_string)),
                None => Ok(None),
            }
        };

        let id_cell = cell(&cells, self.id)?
            .ok_or_else(|| VerifyError::input("sequence id is NULL"))?;
        let sequence_id = id_cell
            .parse::<u64>()
            .map_err(|e| VerifyError::input(format!("invalid sequence id '{id_cell}': {e}")))?;
        let previous_hash = match cell(&cells, self.previous)? {
            Some(h) => HashBytes::from_hex(h)?,
            None => HashBytes::sentinel(),
        };
        let current_hash = match cell(&cells, self.current)? {
            Some(h) => HashBytes::from_hex(h)?,
            None => HashBytes::sentinel(),
        };

        Ok(AuditRecord {
            sequence_id,
            previous_hash,
            current_hash,
            table_name: optional(self.table_name)?,
            action: optional(self.action)?,
        })
    }
}

/// Cell `i` of a row; `NULL` reads as absent.
fn cell<'a>(cells: &[&'a str], i: usize) -> Result<Option<&'a str>, VerifyError> {
    let raw = cells.get(i).copied().ok_or_else(|| {
        VerifyError::input(format!(
            "expected at least {} columns, found {}",
            i + 1,
            cells.len()
        ))
    })?;
    let raw = raw.trim();
    Ok((raw != "NULL").then_some(raw))
}

/// Tab-separated reader. The first non-blank line is the header row.
pub struct TsvRecords<R> {
    lines: Lines<R>,
    line_no: usize,
    columns: Option<TsvColumns>,
}

impl<R: BufRead> TsvRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            columns: None,
        }
    }
}

impl<R: BufRead> Iterator for TsvRecords<R> {
    type Item = Result<AuditRecord, VerifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_no += 1;
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(line_read_error(self.line_no, e))),
            };
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some(columns) = self.columns else {
                match TsvColumns::from_header(line) {
                    Ok(columns) => {
                        self.columns = Some(columns);
                        continue;
                    }
                    Err(e) => return Some(Err(at_line(self.line_no, e))),
                }
            };
            return Some(columns.parse_row(line).map_err(|e| at_line(self.line_no, e)));
        }
    }
}
