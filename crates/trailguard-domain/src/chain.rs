//! Hash-chain linkage verification over a streamed audit trail.

use crate::error::VerifyError;
use crate::fingerprint::fingerprint_for_violation;
use crate::model::{AuditRecord, HashBytes};
use crate::policy::ChainPolicy;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{debug, warn};
use trailguard_types::{ids, ComplianceReport, ReportMetadata, Status, Violation};

/// Verify an ordered audit trail, stamping the report with the current time.
pub fn verify_chain<I>(records: I, policy: &ChainPolicy) -> Result<ComplianceReport, VerifyError>
where
    I: IntoIterator<Item = Result<AuditRecord, VerifyError>>,
{
    verify_chain_at(records, policy, OffsetDateTime::now_utc())
}

/// Verify an ordered audit trail.
///
/// Records are pulled one at a time. The first ordering violation, sequence gap
/// or broken link ends the walk: no further records are pulled and the iterator
/// is dropped before returning. A source or input error aborts the run with no
/// report.
pub fn verify_chain_at<I>(
    records: I,
    policy: &ChainPolicy,
    checked_at: OffsetDateTime,
) -> Result<ComplianceReport, VerifyError>
where
    I: IntoIterator<Item = Result<AuditRecord, VerifyError>>,
{
    let mut walker = ChainWalker::new(policy);
    for item in records {
        let record = item?;
        if let Some(violation) = walker.observe(&record)? {
            return Ok(walker.halt(violation, checked_at));
        }
    }
    Ok(walker.conclude(checked_at))
}

/// Rolling state of one chain walk.
#[derive(Debug)]
pub struct ChainWalker<'a> {
    policy: &'a ChainPolicy,
    expected_previous: HashBytes,
    hash_len: Option<usize>,
    first_sequence_id: Option<u64>,
    last_sequence_id: Option<u64>,
    observed: u64,
}

impl<'a> ChainWalker<'a> {
    pub fn new(policy: &'a ChainPolicy) -> Self {
        Self {
            policy,
            expected_previous: policy.genesis.clone().unwrap_or_default(),
            hash_len: None,
            first_sequence_id: None,
            last_sequence_id: None,
            observed: 0,
        }
    }

    /// Feed the next record. Returns the violation that ends the walk, if any.
    pub fn observe(&mut self, record: &AuditRecord) -> Result<Option<Violation>, VerifyError> {
        self.validate(record)?;
        self.observed += 1;
        let seq = record.sequence_id;

        if let Some(last) = self.last_sequence_id {
            if seq <= last {
                return Ok(Some(chain_violation(
                    ids::CODE_ORDERING,
                    format!(
                        "sequence id {seq} does not follow previous sequence id {last}; records must be strictly ascending"
                    ),
                    &seq.to_string(),
                    json!({
                        "sequence_id": seq,
                        "previous_sequence_id": last,
                    }),
                )));
            }
            let expected = last + 1;
            if !self.policy.allow_gaps && seq != expected {
                let missing = seq - expected;
                return Ok(Some(chain_violation(
                    ids::CODE_SEQUENCE_GAP,
                    format!(
                        "sequence gap before sequence id {seq}: expected {expected}, {missing} id(s) missing"
                    ),
                    &seq.to_string(),
                    json!({
                        "sequence_id": seq,
                        "expected_sequence_id": expected,
                        "missing": missing,
                    }),
                )));
            }
        }

        if !self.expected_previous.is_sentinel() && record.previous_hash != self.expected_previous
        {
            return Ok(Some(chain_violation(
                ids::CODE_CHAIN_BREAK,
                format!(
                    "hash chain broken at sequence id {seq}: previous_hash {} does not match expected {}",
                    record.previous_hash, self.expected_previous
                ),
                &seq.to_string(),
                json!({
                    "sequence_id": seq,
                    "expected_previous_hash": self.expected_previous.to_hex(),
                    "observed_previous_hash": record.previous_hash.to_hex(),
                }),
            )));
        }

        self.expected_previous = record.current_hash.clone();
        self.first_sequence_id.get_or_insert(seq);
        self.last_sequence_id = Some(seq);
        Ok(None)
    }

    /// Hashes are fixed-length within a trail, and every record must carry its own hash.
    fn validate(&mut self, record: &AuditRecord) -> Result<(), VerifyError> {
        let seq = record.sequence_id;
        if record.current_hash.is_sentinel() {
            return Err(VerifyError::input(format!(
                "record {seq}: current_hash is empty"
            )));
        }
        if !record.previous_hash.is_sentinel() {
            self.check_len(seq, "previous_hash", record.previous_hash.len())?;
        }
        self.check_len(seq, "current_hash", record.current_hash.len())
    }

    /// The first hash seen fixes the length for the rest of the trail.
    fn check_len(&mut self, seq: u64, field: &str, len: usize) -> Result<(), VerifyError> {
        match self.hash_len {
            None => self.hash_len = Some(len),
            Some(expected) if expected != len => {
                return Err(VerifyError::input(format!(
                    "record {seq}: {field} is {len} bytes, expected {expected}"
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Build the FAIL report for a walk stopped by `violation`.
    pub fn halt(self, violation: Violation, checked_at: OffsetDateTime) -> ComplianceReport {
        warn!(
            code = %violation.code,
            records = self.observed,
            "audit chain verification halted: {}",
            violation.detail
        );
        let metadata = self.metadata();
        ComplianceReport::new(
            ids::VERIFIER_CHAIN_INTEGRITY,
            Status::Fail,
            vec![violation],
            checked_at,
            metadata,
        )
    }

    /// Build the report for a trail that was consumed to the end.
    pub fn conclude(self, checked_at: OffsetDateTime) -> ComplianceReport {
        let metadata = self.metadata();

        let (status, violations) = if self.observed == 0 {
            (
                Status::Inconclusive,
                vec![chain_violation(
                    ids::CODE_NO_RECORDS,
                    "no records observed".to_string(),
                    "",
                    Value::Null,
                )],
            )
        } else {
            match &self.policy.expected_head {
                Some(head) if *head != self.expected_previous => (
                    Status::Fail,
                    vec![chain_violation(
                        ids::CODE_HEAD_MISMATCH,
                        format!(
                            "chain head {} does not match anchored head {}",
                            self.expected_previous, head
                        ),
                        &head.to_hex(),
                        json!({
                            "observed_head": self.expected_previous.to_hex(),
                            "expected_head": head.to_hex(),
                            "last_sequence_id": self.last_sequence_id,
                        }),
                    )],
                ),
                _ => (Status::Pass, Vec::new()),
            }
        };

        debug!(records = self.observed, status = %status, "audit chain walk complete");
        ComplianceReport::new(
            ids::VERIFIER_CHAIN_INTEGRITY,
            status,
            violations,
            checked_at,
            metadata,
        )
    }

    fn metadata(&self) -> ReportMetadata {
        ReportMetadata {
            records_observed: Some(self.observed),
            first_sequence_id: self.first_sequence_id,
            last_sequence_id: self.last_sequence_id,
            chain_head: (!self.expected_previous.is_sentinel())
                .then(|| self.expected_previous.to_hex()),
            ..ReportMetadata::default()
        }
    }
}

fn chain_violation(code: &str, detail: String, key: &str, data: Value) -> Violation {
    Violation {
        source: ids::VERIFIER_CHAIN_INTEGRITY.to_string(),
        code: code.to_string(),
        detail,
        fingerprint: Some(fingerprint_for_violation(
            ids::VERIFIER_CHAIN_INTEGRITY,
            code,
            key,
        )),
        data,
    }
}
