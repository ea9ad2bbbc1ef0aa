use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trailguard_domain::rules::Operator;

/// `trailguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrailguardConfigV1 {
    /// Optional schema string for tooling (`trailguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Preset rule set: `mysql-baseline` (default) or `empty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default)]
    pub chain: ChainConfig,

    /// Map of rule_id -> override.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOverride>,

    /// Additional inline rules (`[[rule]]` tables), appended after preset and rule-set rules.
    #[serde(default)]
    pub rule: Vec<RuleConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChainConfig {
    /// Tolerate skipped sequence ids. Defaults to `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_gaps: Option<bool>,

    /// Hex hash the first record's `previous_hash` must equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<String>,

    /// Hex hash the last record's `current_hash` must equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_head: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleOverride {
    /// Override preset enable/disable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// One authored rule, as written in a rule-set file or inline config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    pub id: String,

    /// Snapshot variable name, or a list of names that must all satisfy the rule.
    pub target: TargetSpec,

    pub operator: OperatorConfig,

    /// Operand for the operator. Containment operators require a non-empty value.
    #[serde(default)]
    pub expected: String,

    /// Compare values byte-for-byte instead of ASCII case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Message template; supports `{target}`, `{value}` and `{expected}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TargetSpec {
    One(String),
    Many(Vec<String>),
}

impl TargetSpec {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TargetSpec::One(t) => vec![t],
            TargetSpec::Many(ts) => ts,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperatorConfig {
    Equals,
    NotEquals,
    ContainsToken,
    Contains,
}

impl From<OperatorConfig> for Operator {
    fn from(op: OperatorConfig) -> Self {
        match op {
            OperatorConfig::Equals => Operator::Equals,
            OperatorConfig::NotEquals => Operator::NotEquals,
            OperatorConfig::ContainsToken => Operator::ContainsToken,
            OperatorConfig::Contains => Operator::Contains,
        }
    }
}

/// Standalone rule-set file, schema v1.
///
/// TOML files use `[[rule]]` tables; JSON files use a top-level `"rules"` array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleSetV1 {
    /// Optional schema string for tooling (`trailguard.rules.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, alias = "rule")]
    pub rules: Vec<RuleConfig>,
}
