use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Stable schema identifier for the persisted report envelope.
pub const SCHEMA_REPORT_V1: &str = "trailguard.report.v1";

/// Outcome of one verification run.
///
/// Variants are declared in aggregation order: `Pass < Inconclusive < Fail`.
/// Combining several reports yields the worst constituent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Inconclusive,
    Fail,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Inconclusive => "INCONCLUSIVE",
            Status::Fail => "FAIL",
        }
    }

    /// The worse of two statuses.
    pub fn worst(self, other: Status) -> Status {
        self.max(other)
    }

    /// Combined status of several outcomes. An empty set combines to `Pass`.
    pub fn combine<I: IntoIterator<Item = Status>>(statuses: I) -> Status {
        statuses.into_iter().fold(Status::Pass, Status::worst)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected violation.
///
/// `source` names what was violated: the verifier ID for chain violations, the
/// rule identifier for policy violations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub source: String,
    pub code: String,
    pub detail: String,

    /// Stable identifier intended for dedup and trending. A hash of
    /// `source + code + salient key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Violation-specific structured payload (kept open-ended for forward compatibility).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: JsonValue,
}

/// Descriptive facts about the evidence a report was computed from.
///
/// Every field is optional; each verifier fills in the ones that apply to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_observed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_sequence_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sequence_id: Option<u64>,
    /// Lower-case hex of the last `current_hash` accepted into the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_evaluated: Option<u32>,
    /// The snapshot's `_ts` field, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_captured_at: Option<String>,
}

/// Structured outcome of one verification run.
///
/// Fields are private: a report is built once by a verifier and read through
/// accessors afterwards. Equality is structural over `status` and the ordered
/// violation list only; `checked_at`, `verifier` and `metadata` do not take part.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceReport {
    verifier: String,
    status: Status,
    violations: Vec<Violation>,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    checked_at: OffsetDateTime,
    #[serde(default)]
    metadata: ReportMetadata,
}

impl ComplianceReport {
    pub fn new(
        verifier: impl Into<String>,
        status: Status,
        violations: Vec<Violation>,
        checked_at: OffsetDateTime,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            verifier: verifier.into(),
            status,
            violations,
            checked_at,
            metadata,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn checked_at(&self) -> OffsetDateTime {
        self.checked_at
    }

    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }
}

impl PartialEq for ComplianceReport {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.violations == other.violations
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub ended_at: OffsetDateTime,
    pub duration_ms: u64,
}

/// Persisted artifact wrapping one or more compliance reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    /// Worst status across `reports`.
    pub status: Status,
    pub reports: Vec<ComplianceReport>,
}

impl ReportEnvelope {
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.reports.iter().flat_map(|r| r.violations().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn violation(source: &str) -> Violation {
        Violation {
            source: source.to_string(),
            code: "rule_violated".to_string(),
            detail: "bad".to_string(),
            fingerprint: None,
            data: JsonValue::Null,
        }
    }

    #[test]
    fn status_ordering_is_pass_inconclusive_fail() {
        assert!(Status::Pass < Status::Inconclusive);
        assert!(Status::Inconclusive < Status::Fail);
        assert_eq!(Status::Pass.worst(Status::Inconclusive), Status::Inconclusive);
        assert_eq!(Status::Fail.worst(Status::Inconclusive), Status::Fail);
    }

    #[test]
    fn combine_takes_the_worst() {
        assert_eq!(Status::combine(std::iter::empty()), Status::Pass);
        assert_eq!(Status::combine([Status::Pass, Status::Pass]), Status::Pass);
        assert_eq!(
            Status::combine([Status::Pass, Status::Inconclusive]),
            Status::Inconclusive
        );
        assert_eq!(
            Status::combine([Status::Fail, Status::Inconclusive, Status::Pass]),
            Status::Fail
        );
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Status::Inconclusive).unwrap(), json!("INCONCLUSIVE"));
        let parsed: Status = serde_json::from_value(json!("FAIL")).unwrap();
        assert_eq!(parsed, Status::Fail);
    }

    #[test]
    fn equality_ignores_checked_at_and_metadata() {
        let a = ComplianceReport::new(
            "policy.compliance",
            Status::Fail,
            vec![violation("r1")],
            datetime!(2024-01-01 00:00 UTC),
            ReportMetadata::default(),
        );
        let b = ComplianceReport::new(
            "policy.compliance",
            Status::Fail,
            vec![violation("r1")],
            datetime!(2025-06-01 12:30 UTC),
            ReportMetadata {
                rules_evaluated: Some(4),
                ..ReportMetadata::default()
            },
        );
        assert_eq!(a, b);

        let c = ComplianceReport::new(
            "policy.compliance",
            Status::Fail,
            vec![violation("r2")],
            datetime!(2024-01-01 00:00 UTC),
            ReportMetadata::default(),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = ComplianceReport::new(
            "audit.chain_integrity",
            Status::Pass,
            Vec::new(),
            datetime!(2024-03-04 05:06:07 UTC),
            ReportMetadata {
                records_observed: Some(3),
                chain_head: Some("ab".to_string()),
                ..ReportMetadata::default()
            },
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "PASS");
        assert_eq!(value["checked_at"], "2024-03-04T05:06:07Z");
        assert_eq!(value["metadata"]["records_observed"], 3);
        assert!(value["metadata"].get("rules_evaluated").is_none());

        let back: ComplianceReport = serde_json::from_value(value).unwrap();
        assert_eq!(back.verifier(), "audit.chain_integrity");
        assert_eq!(back.checked_at(), report.checked_at());
        assert_eq!(back.metadata(), report.metadata());
    }
}
