//! Data-driven policy rules and their evaluation against a configuration snapshot.

use crate::fingerprint::fingerprint_for_violation;
use crate::model::ConfigurationSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use time::OffsetDateTime;
use tracing::{debug, warn};
use trailguard_types::{ids, ComplianceReport, ReportMetadata, Status, Violation};

/// Comparison a rule applies between an observed value and its expected operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Observed value must equal `expected`.
    Equals,
    /// Observed value must differ from `expected`.
    NotEquals,
    /// Observed comma-delimited list must contain `expected` as one of its tokens.
    ContainsToken,
    /// Observed value must contain `expected` as a substring.
    Contains,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::ContainsToken => "contains_token",
            Operator::Contains => "contains",
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            Operator::Equals => "{target} must be {expected} (observed '{value}')",
            Operator::NotEquals => "{target} must not be {expected}",
            Operator::ContainsToken => "{target} must include {expected} (observed '{value}')",
            Operator::Contains => "{target} must contain {expected} (observed '{value}')",
        }
    }

    fn needs_operand(self) -> bool {
        matches!(self, Operator::ContainsToken | Operator::Contains)
    }

    /// True when `observed` fails the requirement.
    fn violated(self, observed: &str, expected: &str, case_sensitive: bool) -> bool {
        let same = |a: &str, b: &str| {
            if case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        };
        match self {
            Operator::Equals => !same(observed, expected),
            Operator::NotEquals => same(observed, expected),
            Operator::ContainsToken => {
                let wanted = expected.trim();
                !observed.split(',').any(|token| same(token.trim(), wanted))
            }
            Operator::Contains => {
                if case_sensitive {
                    !observed.contains(expected)
                } else {
                    !observed
                        .to_ascii_lowercase()
                        .contains(&expected.to_ascii_lowercase())
                }
            }
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MISSING_EVIDENCE_TEMPLATE: &str =
    "missing evidence: variable '{target}' not present in snapshot";

/// One declarative requirement over snapshot variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    /// Every target must satisfy the requirement.
    pub targets: Vec<String>,
    pub operator: Operator,
    pub expected: String,
    pub case_sensitive: bool,
    /// Message template; `None` selects the operator's default.
    pub message: Option<String>,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        target: impl Into<String>,
        operator: Operator,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            targets: vec![target.into()],
            operator,
            expected: expected.into(),
            case_sensitive: false,
            message: None,
        }
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn template(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.operator.default_template())
    }

    /// Check that the rule can be evaluated at all.
    pub fn validate(&self) -> Result<(), RuleFault> {
        if self.targets.is_empty() || self.targets.iter().any(|t| t.trim().is_empty()) {
            return Err(RuleFault::NoTarget);
        }
        if self.operator.needs_operand() && self.expected.trim().is_empty() {
            return Err(RuleFault::EmptyExpected(self.operator));
        }
        render_template(self.template(), "", "", "").map(|_| ())
    }
}

/// A malformed rule. Reported as an `evaluation_error` violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleFault {
    #[error("rule has no target variable")]
    NoTarget,

    #[error("operator '{0}' requires a non-empty expected value")]
    EmptyExpected(Operator),

    #[error("unknown placeholder '{{{0}}}' in message template")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder in message template")]
    UnterminatedPlaceholder,
}

/// Substitute `{target}`, `{value}` and `{expected}`. `{{` and `}}` are literal braces.
pub fn render_template(
    template: &str,
    target: &str,
    value: &str,
    expected: &str,
) -> Result<String, RuleFault> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(RuleFault::UnterminatedPlaceholder);
                }
                match name.as_str() {
                    "target" => out.push_str(target),
                    "value" => out.push_str(value),
                    "expected" => out.push_str(expected),
                    _ => return Err(RuleFault::UnknownPlaceholder(name)),
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Built-in MySQL hardening rules, in evaluation order.
pub fn mysql_baseline_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            ids::RULE_MYSQL_REQUIRE_SECURE_TRANSPORT,
            "require_secure_transport",
            Operator::Equals,
            "ON",
        ),
        Rule::new(
            ids::RULE_MYSQL_LOCAL_INFILE,
            "local_infile",
            Operator::Equals,
            "OFF",
        ),
        Rule::new(
            ids::RULE_MYSQL_SKIP_NAME_RESOLVE,
            "skip_name_resolve",
            Operator::Equals,
            "ON",
        ),
        Rule::new(
            ids::RULE_MYSQL_SQL_MODE_STRICT,
            "sql_mode",
            Operator::ContainsToken,
            "STRICT_ALL_TABLES",
        ),
    ]
}

/// Evaluate `rules` against `snapshot`, stamping the report with the current time.
pub fn evaluate_policy(snapshot: &ConfigurationSnapshot, rules: &[Rule]) -> ComplianceReport {
    evaluate_policy_at(snapshot, rules, OffsetDateTime::now_utc())
}

/// Evaluate every rule in order. Violations appear in rule order; a malformed
/// rule yields an `evaluation_error` violation and evaluation continues.
pub fn evaluate_policy_at(
    snapshot: &ConfigurationSnapshot,
    rules: &[Rule],
    checked_at: OffsetDateTime,
) -> ComplianceReport {
    let violations: Vec<Violation> = rules
        .iter()
        .filter_map(|rule| evaluate_rule(rule, snapshot))
        .collect();

    let status = if violations.is_empty() {
        Status::Pass
    } else {
        Status::Fail
    };
    debug!(
        rules = rules.len(),
        violations = violations.len(),
        status = %status,
        "policy evaluation complete"
    );

    ComplianceReport::new(
        ids::VERIFIER_POLICY_COMPLIANCE,
        status,
        violations,
        checked_at,
        ReportMetadata {
            rules_evaluated: Some(u32::try_from(rules.len()).unwrap_or(u32::MAX)),
            snapshot_captured_at: snapshot.captured_at().map(str::to_string),
            ..ReportMetadata::default()
        },
    )
}

fn evaluate_rule(rule: &Rule, snapshot: &ConfigurationSnapshot) -> Option<Violation> {
    match check_rule(rule, snapshot) {
        Ok(outcome) => outcome,
        Err(fault) => {
            warn!(rule = %rule.id, "rule could not be evaluated: {fault}");
            Some(Violation {
                source: rule.id.clone(),
                code: ids::CODE_EVALUATION_ERROR.to_string(),
                detail: format!("evaluation error: {fault}"),
                fingerprint: Some(fingerprint_for_violation(
                    &rule.id,
                    ids::CODE_EVALUATION_ERROR,
                    &rule.targets.join(","),
                )),
                data: json!({
                    "rule": rule.id,
                    "operator": rule.operator.as_str(),
                }),
            })
        }
    }
}

fn check_rule(
    rule: &Rule,
    snapshot: &ConfigurationSnapshot,
) -> Result<Option<Violation>, RuleFault> {
    rule.validate()?;

    let mut reasons = Vec::new();
    let mut missing = false;
    let mut observed = Map::new();

    for target in &rule.targets {
        match snapshot.get(target) {
            None => {
                missing = true;
                observed.insert(target.clone(), Value::Null);
                reasons.push(render_template(
                    MISSING_EVIDENCE_TEMPLATE,
                    target,
                    "",
                    &rule.expected,
                )?);
            }
            Some(value) => {
                observed.insert(target.clone(), Value::String(value.to_string()));
                if rule
                    .operator
                    .violated(value, &rule.expected, rule.case_sensitive)
                {
                    reasons.push(render_template(
                        rule.template(),
                        target,
                        value,
                        &rule.expected,
                    )?);
                }
            }
        }
    }

    if reasons.is_empty() {
        return Ok(None);
    }

    let code = if missing {
        ids::CODE_MISSING_EVIDENCE
    } else {
        ids::CODE_RULE_VIOLATED
    };
    Ok(Some(Violation {
        source: rule.id.clone(),
        code: code.to_string(),
        detail: reasons.join("; "),
        fingerprint: Some(fingerprint_for_violation(
            &rule.id,
            code,
            &rule.targets.join(","),
        )),
        data: json!({
            "rule": rule.id,
            "targets": rule.targets,
            "operator": rule.operator.as_str(),
            "expected": rule.expected,
            "observed": observed,
        }),
    }))
}
