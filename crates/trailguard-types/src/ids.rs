//! Stable identifiers for verifiers and violation codes.
//!
//! Verifier IDs are a dotted namespace. `code` is a short snake_case discriminator.
//! Policy violations use the rule identifier as their `source`, not the verifier ID.

// Verifiers
pub const VERIFIER_CHAIN_INTEGRITY: &str = "audit.chain_integrity";
pub const VERIFIER_POLICY_COMPLIANCE: &str = "policy.compliance";

// Codes: audit.chain_integrity
pub const CODE_CHAIN_BREAK: &str = "chain_break";
pub const CODE_ORDERING: &str = "ordering";
pub const CODE_SEQUENCE_GAP: &str = "sequence_gap";
pub const CODE_NO_RECORDS: &str = "no_records";
pub const CODE_HEAD_MISMATCH: &str = "head_mismatch";

// Codes: policy.compliance
pub const CODE_RULE_VIOLATED: &str = "rule_violated";
pub const CODE_MISSING_EVIDENCE: &str = "missing_evidence";
pub const CODE_EVALUATION_ERROR: &str = "evaluation_error";

// Tool-level (raised as errors, never placed in a report)
pub const CODE_INPUT_ERROR: &str = "input_error";
pub const CODE_SOURCE_ERROR: &str = "source_error";

// Baseline rule identifiers (mysql-baseline profile)
pub const RULE_MYSQL_REQUIRE_SECURE_TRANSPORT: &str = "mysql.require_secure_transport";
pub const RULE_MYSQL_LOCAL_INFILE: &str = "mysql.local_infile";
pub const RULE_MYSQL_SKIP_NAME_RESOLVE: &str = "mysql.skip_name_resolve";
pub const RULE_MYSQL_SQL_MODE_STRICT: &str = "mysql.sql_mode_strict";
