//! The `verify` use case: resolve policy, read evidence, run verifiers, produce a report.

use anyhow::Context;
use camino::Utf8Path;
use time::OffsetDateTime;
use trailguard_domain::policy::ChainPolicy;
use trailguard_domain::rules::Rule;
use trailguard_domain::{ChainVerifier, PolicyVerifier, Verifier, VerifyError, combined_status};
use trailguard_evidence::RecordFormat;
use trailguard_settings::{Overrides, ResolvedConfig, RuleSetFormat};
use trailguard_types::{
    ComplianceReport, ReportEnvelope, RunMeta, SCHEMA_REPORT_V1, Status, ToolMeta,
};

pub const EXIT_PASS: i32 = 0;
pub const EXIT_FAIL: i32 = 1;
pub const EXIT_INCONCLUSIVE: i32 = 2;
pub const EXIT_INPUT_ERROR: i32 = 3;
pub const EXIT_SOURCE_ERROR: i32 = 4;

/// Input for the verify use case.
#[derive(Clone, Debug)]
pub struct VerifyInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Standalone rule-set file contents and format, if one was given.
    pub rules_text: Option<(&'a str, RuleSetFormat)>,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Audit trail export to verify.
    pub records: Option<&'a Utf8Path>,
    /// Explicit export format; inferred from the extension when absent.
    pub records_format: Option<RecordFormat>,
    /// Configuration snapshot to evaluate.
    pub snapshot: Option<&'a Utf8Path>,
}

/// Output from the verify use case.
#[derive(Clone, Debug)]
pub struct VerifyOutput {
    pub envelope: ReportEnvelope,
    pub resolved_config: ResolvedConfig,
}

/// Run the verify use case.
///
/// When both kinds of evidence are given the two verifiers run on parallel
/// workers. Reports are always ordered chain first, then policy.
pub fn run_verify(input: VerifyInput<'_>) -> anyhow::Result<VerifyOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        trailguard_settings::TrailguardConfigV1::default()
    } else {
        trailguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let rule_set = input
        .rules_text
        .map(|(text, format)| trailguard_settings::parse_rule_set(text, format))
        .transpose()
        .context("parse rule set")?;

    let resolved = trailguard_settings::resolve_config(cfg, rule_set, input.overrides.clone())
        .context("resolve config")?;

    if input.records.is_none() && input.snapshot.is_none() {
        anyhow::bail!("nothing to verify: provide audit records and/or a configuration snapshot");
    }

    let effective = &resolved.effective;
    let (chain, policy) = rayon::join(
        || {
            input
                .records
                .map(|path| verify_records(path, input.records_format, &effective.chain))
                .transpose()
        },
        || {
            input
                .snapshot
                .map(|path| verify_snapshot(path, &effective.rules))
                .transpose()
        },
    );

    let reports: Vec<ComplianceReport> = [chain?, policy?].into_iter().flatten().collect();
    let status = combined_status(&reports);

    let ended_at = OffsetDateTime::now_utc();
    let duration_ms = u64::try_from((ended_at - started_at).whole_milliseconds().max(0))
        .unwrap_or(u64::MAX);

    tracing::info!(
        status = %status,
        reports = reports.len(),
        violations = reports.iter().map(|r| r.violations().len()).sum::<usize>(),
        profile = %effective.profile,
        "verification complete"
    );

    let envelope = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "trailguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at,
            ended_at,
            duration_ms,
        },
        status,
        reports,
    };

    Ok(VerifyOutput {
        envelope,
        resolved_config: resolved,
    })
}

fn verify_records(
    path: &Utf8Path,
    format: Option<RecordFormat>,
    policy: &ChainPolicy,
) -> anyhow::Result<ComplianceReport> {
    let records = trailguard_evidence::open_records(path, format)?;
    tracing::debug!(path = %path, "chain verification start");
    let report = ChainVerifier::new(policy.clone())
        .verify(records)
        .with_context(|| format!("verify audit records {path}"))?;
    Ok(report)
}

fn verify_snapshot(path: &Utf8Path, rules: &[Rule]) -> anyhow::Result<ComplianceReport> {
    let snapshot = trailguard_evidence::read_snapshot(path)?;
    tracing::debug!(path = %path, rules = rules.len(), "policy evaluation start");
    let report = PolicyVerifier::new(rules.to_vec())
        .verify(&snapshot)
        .with_context(|| format!("evaluate snapshot {path}"))?;
    Ok(report)
}

/// Map a combined status to a process exit code.
pub fn status_exit_code(status: Status) -> i32 {
    match status {
        Status::Pass => EXIT_PASS,
        Status::Fail => EXIT_FAIL,
        Status::Inconclusive => EXIT_INCONCLUSIVE,
    }
}

/// Map a run-aborting error to a process exit code.
///
/// Evidence read failures and artifact write failures are I/O errors;
/// malformed evidence and bad configuration are input errors.
pub fn error_exit_code(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|e| e.downcast_ref::<VerifyError>()) {
        Some(VerifyError::Source { .. }) => EXIT_SOURCE_ERROR,
        Some(VerifyError::Input(_)) | None => EXIT_INPUT_ERROR,
    }
}
