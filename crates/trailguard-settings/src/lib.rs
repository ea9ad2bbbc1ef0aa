//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{
    ChainConfig, OperatorConfig, RuleConfig, RuleOverride, RuleSetV1, TargetSpec,
    TrailguardConfigV1,
};
pub use presets::{DEFAULT_PROFILE, PROFILE_EMPTY, PROFILE_MYSQL_BASELINE};
pub use resolve::{Overrides, ResolvedConfig};

pub const SCHEMA_CONFIG_V1: &str = "trailguard.config.v1";
pub const SCHEMA_RULES_V1: &str = "trailguard.rules.v1";

/// Serialization of a standalone rule-set file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleSetFormat {
    Toml,
    Json,
}

impl RuleSetFormat {
    /// `.json` selects JSON; anything else is read as TOML.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(e) if e.eq_ignore_ascii_case("json") => RuleSetFormat::Json,
            _ => RuleSetFormat::Toml,
        }
    }
}

/// Parse `trailguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<TrailguardConfigV1> {
    let cfg: TrailguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Parse a standalone rule-set file.
pub fn parse_rule_set(input: &str, format: RuleSetFormat) -> anyhow::Result<RuleSetV1> {
    let rules: RuleSetV1 = match format {
        RuleSetFormat::Toml => toml::from_str(input)?,
        RuleSetFormat::Json => serde_json::from_str(input)?,
    };
    Ok(rules)
}

/// Resolve the effective config used by the engine (profile + rule set + inline rules + overrides).
pub fn resolve_config(
    cfg: TrailguardConfigV1,
    rule_set: Option<RuleSetV1>,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, rule_set, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailguard_domain::rules::Operator;
    use trailguard_types::ids;

    fn rule_ids(resolved: &ResolvedConfig) -> Vec<&str> {
        resolved
            .effective
            .rules
            .iter()
            .map(|r| r.id.as_str())
            .collect()
    }

    #[test]
    fn empty_config_resolves_to_mysql_baseline() {
        let resolved =
            resolve_config(TrailguardConfigV1::default(), None, Overrides::default()).unwrap();
        assert_eq!(resolved.effective.profile, "mysql-baseline");
        assert_eq!(
            rule_ids(&resolved),
            vec![
                ids::RULE_MYSQL_REQUIRE_SECURE_TRANSPORT,
                ids::RULE_MYSQL_LOCAL_INFILE,
                ids::RULE_MYSQL_SKIP_NAME_RESOLVE,
                ids::RULE_MYSQL_SQL_MODE_STRICT,
            ]
        );
        assert!(!resolved.effective.chain.allow_gaps);
        assert!(resolved.effective.chain.genesis.is_none());
    }

    #[test]
    fn full_config_parses_and_resolves() {
        let cfg = parse_config_toml(
            r#"
schema = "trailguard.config.v1"
profile = "mysql-baseline"

[chain]
allow_gaps = true
genesis = "00AB"
expected_head = "ff01"

[rules."mysql.local_infile"]
enabled = false

[[rule]]
id = "mysql.tls_version"
target = "tls_version"
operator = "contains_token"
expected = "TLSv1.3"

[[rule]]
id = "mysql.ssl_files"
target = ["ssl_cert", "ssl_key"]
operator = "not_equals"
expected = ""
case_sensitive = true
message = "{target} must be configured"
"#,
        )
        .unwrap();

        let resolved = resolve_config(cfg, None, Overrides::default()).unwrap();
        let eff = &resolved.effective;
        assert!(eff.chain.allow_gaps);
        assert_eq!(eff.chain.genesis.as_ref().map(|h| h.to_hex()), Some("00ab".to_string()));
        assert_eq!(
            eff.chain.expected_head.as_ref().map(|h| h.to_hex()),
            Some("ff01".to_string())
        );
        assert!(eff.rule(ids::RULE_MYSQL_LOCAL_INFILE).is_none());

        let tls = eff.rule("mysql.tls_version").unwrap();
        assert_eq!(tls.operator, Operator::ContainsToken);
        assert_eq!(tls.targets, vec!["tls_version".to_string()]);

        let files = eff.rule("mysql.ssl_files").unwrap();
        assert_eq!(files.targets.len(), 2);
        assert!(files.case_sensitive);
        assert_eq!(files.message.as_deref(), Some("{target} must be configured"));
        assert_eq!(rule_ids(&resolved).last(), Some(&"mysql.ssl_files"));
    }

    #[test]
    fn rule_set_rules_come_before_inline_rules() {
        let rule_set = parse_rule_set(
            r#"{"schema":"trailguard.rules.v1","rules":[
                {"id":"site.a","target":"a","operator":"equals","expected":"1"}
            ]}"#,
            RuleSetFormat::Json,
        )
        .unwrap();
        let cfg = parse_config_toml(
            r#"
profile = "empty"
[[rule]]
id = "site.b"
target = "b"
operator = "equals"
expected = "2"
"#,
        )
        .unwrap();
        let resolved = resolve_config(cfg, Some(rule_set), Overrides::default()).unwrap();
        assert_eq!(rule_ids(&resolved), vec!["site.a", "site.b"]);
    }

    #[test]
    fn toml_rule_set_uses_rule_tables() {
        let rule_set = parse_rule_set(
            r#"
[[rule]]
id = "site.strict"
target = "sql_mode"
operator = "contains"
expected = "STRICT"
"#,
            RuleSetFormat::Toml,
        )
        .unwrap();
        assert_eq!(rule_set.rules.len(), 1);
        assert_eq!(rule_set.rules[0].operator, OperatorConfig::Contains);
    }

    #[test]
    fn duplicate_rule_ids_are_rejected() {
        let rule_set = RuleSetV1 {
            schema: None,
            rules: vec![RuleConfig {
                id: ids::RULE_MYSQL_LOCAL_INFILE.to_string(),
                target: TargetSpec::One("local_infile".to_string()),
                operator: OperatorConfig::Equals,
                expected: "OFF".to_string(),
                case_sensitive: None,
                message: None,
            }],
        };
        let err = resolve_config(
            TrailguardConfigV1::default(),
            Some(rule_set),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate rule id: mysql.local_infile"));
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let overrides = Overrides {
            profile: Some("postgres".to_string()),
            ..Overrides::default()
        };
        let err = resolve_config(TrailguardConfigV1::default(), None, overrides).unwrap_err();
        assert!(err.to_string().contains("unknown profile: postgres"));
    }

    #[test]
    fn override_for_unknown_rule_is_rejected() {
        let cfg = parse_config_toml("[rules.\"mysql.nope\"]\nenabled = false\n").unwrap();
        let err = resolve_config(cfg, None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("mysql.nope"));
    }

    #[test]
    fn cli_overrides_win() {
        let cfg = parse_config_toml(
            "profile = \"empty\"\n[chain]\nallow_gaps = false\nexpected_head = \"aa\"\n",
        )
        .unwrap();
        let overrides = Overrides {
            profile: Some("mysql-baseline".to_string()),
            allow_gaps: Some(true),
            expected_head: Some("BB".to_string()),
        };
        let resolved = resolve_config(cfg, None, overrides).unwrap();
        assert_eq!(resolved.effective.profile, "mysql-baseline");
        assert_eq!(resolved.effective.rules.len(), 4);
        assert!(resolved.effective.chain.allow_gaps);
        assert_eq!(
            resolved.effective.chain.expected_head.map(|h| h.to_hex()),
            Some("bb".to_string())
        );
    }

    #[test]
    fn invalid_anchor_hex_is_rejected() {
        let cfg = parse_config_toml("[chain]\ngenesis = \"not-hex\"\n").unwrap();
        let err = resolve_config(cfg, None, Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid chain.genesis"));
    }

    #[test]
    fn unknown_operator_fails_to_parse() {
        let err = parse_rule_set(
            "[[rule]]\nid = \"x\"\ntarget = \"x\"\noperator = \"matches\"\n",
            RuleSetFormat::Toml,
        )
        .unwrap_err();
        assert!(err.to_string().contains("matches"));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(RuleSetFormat::from_extension(Some("JSON")), RuleSetFormat::Json);
        assert_eq!(RuleSetFormat::from_extension(Some("toml")), RuleSetFormat::Toml);
        assert_eq!(RuleSetFormat::from_extension(None), RuleSetFormat::Toml);
    }
}
