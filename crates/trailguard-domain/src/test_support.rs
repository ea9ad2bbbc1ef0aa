use crate::error::VerifyError;
use crate::model::{AuditRecord, ConfigurationSnapshot, HashBytes};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::macros::datetime;

pub fn checked_at() -> OffsetDateTime {
    datetime!(2024-01-01 00:00 UTC)
}

pub fn sha256(bytes: &[u8]) -> HashBytes {
    HashBytes::from_bytes(Sha256::digest(bytes).to_vec())
}

/// Correctly linked records `first..=last`; the first record has the sentinel
/// as its previous hash.
pub fn linked_chain(first: u64, last: u64) -> Vec<AuditRecord> {
    let mut previous = HashBytes::sentinel();
    (first..=last)
        .map(|seq| {
            let mut content = previous.as_bytes().to_vec();
            content.extend_from_slice(format!("record-{seq}").as_bytes());
            let current = sha256(&content);
            let record = AuditRecord::new(seq, previous.clone(), current.clone());
            previous = current;
            record
        })
        .collect()
}

pub fn ok_records(records: Vec<AuditRecord>) -> Vec<Result<AuditRecord, VerifyError>> {
    records.into_iter().map(Ok).collect()
}

pub fn snapshot(pairs: &[(&str, &str)]) -> ConfigurationSnapshot {
    ConfigurationSnapshot::from_pairs(pairs.iter().copied())
}

/// A snapshot satisfying every `mysql-baseline` rule.
pub fn baseline_snapshot() -> ConfigurationSnapshot {
    snapshot(&[
        ("require_secure_transport", "ON"),
        ("local_infile", "OFF"),
        ("skip_name_resolve", "ON"),
        ("sql_mode", "STRICT_ALL_TABLES,NO_ZERO_DATE"),
    ])
}
