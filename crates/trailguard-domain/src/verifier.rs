use crate::chain::verify_chain_at;
use crate::error::VerifyError;
use crate::model::{AuditRecord, ConfigurationSnapshot};
use crate::policy::ChainPolicy;
use crate::rules::{evaluate_policy_at, Rule};
use time::OffsetDateTime;
use trailguard_types::{ids, ComplianceReport, Status};

/// Common contract of every verifier: typed evidence in, one report out.
///
/// Compliance outcomes are always a report; `Err` means the evidence itself
/// could not be read or parsed.
pub trait Verifier<E> {
    /// Stable verifier identifier (see `trailguard_types::ids`).
    fn id(&self) -> &'static str;

    fn verify_at(
        &self,
        evidence: E,
        checked_at: OffsetDateTime,
    ) -> Result<ComplianceReport, VerifyError>;

    fn verify(&self, evidence: E) -> Result<ComplianceReport, VerifyError> {
        self.verify_at(evidence, OffsetDateTime::now_utc())
    }
}

/// Hash-chain linkage over a stream of audit records.
#[derive(Clone, Debug, Default)]
pub struct ChainVerifier {
    policy: ChainPolicy,
}

impl ChainVerifier {
    pub fn new(policy: ChainPolicy) -> Self {
        Self { policy }
    }
}

impl<I> Verifier<I> for ChainVerifier
where
    I: IntoIterator<Item = Result<AuditRecord, VerifyError>>,
{
    fn id(&self) -> &'static str {
        ids::VERIFIER_CHAIN_INTEGRITY
    }

    fn verify_at(
        &self,
        records: I,
        checked_at: OffsetDateTime,
    ) -> Result<ComplianceReport, VerifyError> {
        verify_chain_at(records, &self.policy, checked_at)
    }
}

/// Ordered rule set over a configuration snapshot.
#[derive(Clone, Debug, Default)]
pub struct PolicyVerifier {
    rules: Vec<Rule>,
}

impl PolicyVerifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl Verifier<&ConfigurationSnapshot> for PolicyVerifier {
    fn id(&self) -> &'static str {
        ids::VERIFIER_POLICY_COMPLIANCE
    }

    fn verify_at(
        &self,
        snapshot: &ConfigurationSnapshot,
        checked_at: OffsetDateTime,
    ) -> Result<ComplianceReport, VerifyError> {
        Ok(evaluate_policy_at(snapshot, &self.rules, checked_at))
    }
}

/// Worst status across `reports`; `Pass` when there are none.
pub fn combined_status(reports: &[ComplianceReport]) -> Status {
    Status::combine(reports.iter().map(ComplianceReport::status))
}
