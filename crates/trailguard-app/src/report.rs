use anyhow::Context;
use camino::Utf8Path;
use trailguard_domain::VerifyError;
use trailguard_render::{
    RenderableReport, RenderableSection, RenderableStatus, RenderableViolation,
};
use trailguard_types::{ComplianceReport, ReportEnvelope, SCHEMA_REPORT_V1, Status};

/// Parse a persisted report envelope, rejecting unknown schema identifiers.
pub fn parse_report_json(text: &str) -> anyhow::Result<ReportEnvelope> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    let envelope: ReportEnvelope =
        serde_json::from_value(value).context("parse trailguard report")?;
    Ok(envelope)
}

pub fn serialize_report(envelope: &ReportEnvelope) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(envelope).context("serialize report")
}

/// Write a report artifact, creating parent directories.
///
/// Failures are I/O errors (exit 4), never input errors.
pub fn write_artifact(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| VerifyError::io(format!("create directory {parent}"), e))?;
    }
    std::fs::write(path, data).map_err(|e| VerifyError::io(format!("write {path}"), e))?;
    Ok(())
}

pub fn to_renderable(envelope: &ReportEnvelope) -> RenderableReport {
    RenderableReport {
        status: renderable_status(envelope.status),
        sections: envelope.reports.iter().map(section_from_report).collect(),
    }
}

fn renderable_status(status: Status) -> RenderableStatus {
    match status {
        Status::Pass => RenderableStatus::Pass,
        Status::Inconclusive => RenderableStatus::Inconclusive,
        Status::Fail => RenderableStatus::Fail,
    }
}

fn section_from_report(report: &ComplianceReport) -> RenderableSection {
    let meta = report.metadata();
    let mut facts = Vec::new();
    let mut fact = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            facts.push((label.to_string(), value));
        }
    };
    fact("Records observed", meta.records_observed.map(|n| n.to_string()));
    fact("First sequence id", meta.first_sequence_id.map(|n| n.to_string()));
    fact("Last sequence id", meta.last_sequence_id.map(|n| n.to_string()));
    fact("Chain head", meta.chain_head.as_ref().map(|h| format!("`{h}`")));
    fact("Rules evaluated", meta.rules_evaluated.map(|n| n.to_string()));
    fact("Snapshot captured at", meta.snapshot_captured_at.clone());

    RenderableSection {
        verifier: report.verifier().to_string(),
        status: renderable_status(report.status()),
        facts,
        violations: report
            .violations()
            .iter()
            .map(|v| RenderableViolation {
                source: v.source.clone(),
                code: v.code.clone(),
                detail: v.detail.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use trailguard_types::{ReportMetadata, RunMeta, ToolMeta, Violation, ids};

    fn envelope() -> ReportEnvelope {
        let at = datetime!(2024-05-01 12:00 UTC);
        let chain = ComplianceReport::new(
            ids::VERIFIER_CHAIN_INTEGRITY,
            Status::Pass,
            Vec::new(),
            at,
            ReportMetadata {
                records_observed: Some(3),
                first_sequence_id: Some(1),
                last_sequence_id: Some(3),
                chain_head: Some("ab12".to_string()),
                ..ReportMetadata::default()
            },
        );
        let policy = ComplianceReport::new(
            ids::VERIFIER_POLICY_COMPLIANCE,
            Status::Fail,
            vec![Violation {
                source: ids::RULE_MYSQL_LOCAL_INFILE.to_string(),
                code: ids::CODE_RULE_VIOLATED.to_string(),
                detail: "local_infile must be OFF (observed 'ON')".to_string(),
                fingerprint: Some("f".repeat(64)),
                data: serde_json::json!({ "rule": ids::RULE_MYSQL_LOCAL_INFILE }),
            }],
            at,
            ReportMetadata {
                rules_evaluated: Some(4),
                snapshot_captured_at: Some("2024-05-01T11:59:00Z".to_string()),
                ..ReportMetadata::default()
            },
        );
        ReportEnvelope {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "trailguard".to_string(),
                version: "0.1.0".to_string(),
            },
            run: RunMeta {
                started_at: at,
                ended_at: at,
                duration_ms: 0,
            },
            status: Status::Fail,
            reports: vec![chain, policy],
        }
    }

    #[test]
    fn serialized_report_parses_back() {
        let env = envelope();
        let bytes = serialize_report(&env).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"schema\": \"trailguard.report.v1\""));
        assert!(text.contains("\"status\": \"FAIL\""));

        let parsed = parse_report_json(&text).unwrap();
        assert_eq!(parsed, env);
        assert_eq!(
            parsed.reports[1].metadata().snapshot_captured_at.as_deref(),
            Some("2024-05-01T11:59:00Z")
        );
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let err = parse_report_json(r#"{"schema":"sarif.report.v1"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown report schema: sarif.report.v1"));

        let err = parse_report_json("{}").unwrap_err();
        assert!(err.to_string().contains("unknown report schema"));
    }

    #[test]
    fn write_artifact_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let path = root.join("artifacts/trailguard/report.json");
        write_artifact(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn unwritable_artifact_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let blocker = root.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = write_artifact(&blocker.join("report.json"), b"{}").unwrap_err();
        assert_eq!(crate::error_exit_code(&err), crate::EXIT_SOURCE_ERROR);
        assert!(err.to_string().contains("create directory"));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = parse_report_json("not json").unwrap_err();
        assert!(err.to_string().contains("parse report json"));
    }

    #[test]
    fn renderable_keeps_sections_and_facts_in_order() {
        let r = to_renderable(&envelope());
        assert_eq!(r.status, RenderableStatus::Fail);
        assert_eq!(r.sections.len(), 2);

        let chain = &r.sections[0];
        assert_eq!(chain.verifier, ids::VERIFIER_CHAIN_INTEGRITY);
        assert_eq!(chain.status, RenderableStatus::Pass);
        let labels: Vec<_> = chain.facts.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Records observed", "First sequence id", "Last sequence id", "Chain head"]
        );
        assert_eq!(chain.facts[3].1, "`ab12`");

        let policy = &r.sections[1];
        assert_eq!(policy.facts[0], ("Rules evaluated".to_string(), "4".to_string()));
        assert_eq!(policy.violations.len(), 1);
        assert_eq!(policy.violations[0].code, ids::CODE_RULE_VIOLATED);
        assert_eq!(r.violation_count(), 1);
    }
}
