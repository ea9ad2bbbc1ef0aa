//! Correctly linked audit trail fixtures.
//!
//! Each record's `current_hash` is `sha256("{previous_hash_hex}|{sequence_id}")`,
//! with the empty string standing in for the first record's missing predecessor.

use sha2::{Digest, Sha256};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureRecord {
    pub sequence_id: u64,
    /// Lower-case hex; empty for the first record.
    pub previous_hash: String,
    pub current_hash: String,
    pub table_name: String,
    pub action: String,
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Records `first..=last`, correctly linked.
pub fn linked_chain(first: u64, last: u64) -> Vec<FixtureRecord> {
    let mut previous = String::new();
    (first..=last)
        .map(|seq| {
            let current = sha256_hex(format!("{previous}|{seq}").as_bytes());
            FixtureRecord {
                sequence_id: seq,
                previous_hash: std::mem::replace(&mut previous, current.clone()),
                current_hash: current,
                table_name: "accounts".to_string(),
                action: if seq % 2 == 0 { "UPDATE" } else { "INSERT" }.to_string(),
            }
        })
        .collect()
}

/// JSON Lines export using camelCase field names.
pub fn to_jsonl(records: &[FixtureRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let line = serde_json::json!({
            "sequenceId": r.sequence_id,
            "previousHash": r.previous_hash,
            "currentHash": r.current_hash,
            "tableName": r.table_name,
            "action": r.action,
        });
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

/// `mysql --batch` style export: header row, upper-case hex, `NULL` for the sentinel.
pub fn to_tsv(records: &[FixtureRecord]) -> String {
    let mut out = String::from("id\tHEX(prev_hash)\tHEX(curr_hash)\ttable_name\taction\n");
    for r in records {
        let prev = if r.previous_hash.is_empty() {
            "NULL".to_string()
        } else {
            r.previous_hash.to_uppercase()
        };
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            r.sequence_id,
            prev,
            r.current_hash.to_uppercase(),
            r.table_name,
            r.action
        ));
    }
    out
}
