use crate::model::{RuleConfig, RuleSetV1, TrailguardConfigV1};
use crate::presets;
use anyhow::Context;
use std::collections::BTreeSet;
use trailguard_domain::model::HashBytes;
use trailguard_domain::policy::EffectiveConfig;
use trailguard_domain::rules::Rule;

/// Command-line overrides. Each one wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub allow_gaps: Option<bool>,
    pub expected_head: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: TrailguardConfigV1,
    rule_set: Option<RuleSetV1>,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| presets::DEFAULT_PROFILE.to_string());

    let mut effective = presets::preset(&profile)?;

    // Chain policy
    if let Some(allow_gaps) = overrides.allow_gaps.or(cfg.chain.allow_gaps) {
        effective.chain.allow_gaps = allow_gaps;
    }
    if let Some(genesis) = cfg.chain.genesis.as_deref() {
        effective.chain.genesis = Some(parse_anchor("chain.genesis", genesis)?);
    }
    if let Some(head) = overrides
        .expected_head
        .as_deref()
        .or(cfg.chain.expected_head.as_deref())
    {
        effective.chain.expected_head = Some(parse_anchor("chain.expected_head", head)?);
    }

    // Rules: preset, then rule-set file, then inline.
    let authored = rule_set
        .into_iter()
        .flat_map(|rs| rs.rules)
        .chain(cfg.rule.iter().cloned());
    for rc in authored {
        effective.rules.push(build_rule(rc));
    }

    let mut seen = BTreeSet::new();
    for rule in &effective.rules {
        if !seen.insert(rule.id.as_str()) {
            anyhow::bail!("duplicate rule id: {}", rule.id);
        }
    }

    // Per-rule enable/disable
    let mut disabled = BTreeSet::new();
    for (rule_id, ov) in cfg.rules.iter() {
        if !seen.contains(rule_id.as_str()) {
            anyhow::bail!("override for unknown rule: {rule_id}");
        }
        if ov.enabled == Some(false) {
            disabled.insert(rule_id.clone());
        }
    }
    effective.rules.retain(|r| !disabled.contains(&r.id));

    Ok(ResolvedConfig { effective })
}

fn build_rule(rc: RuleConfig) -> Rule {
    Rule {
        id: rc.id,
        targets: rc.target.into_vec(),
        operator: rc.operator.into(),
        expected: rc.expected,
        case_sensitive: rc.case_sensitive.unwrap_or(false),
        message: rc.message,
    }
}

fn parse_anchor(field: &str, value: &str) -> anyhow::Result<HashBytes> {
    let hash = HashBytes::from_hex(value).with_context(|| format!("invalid {field}"))?;
    if hash.is_sentinel() {
        anyhow::bail!("invalid {field}: empty hash");
    }
    Ok(hash)
}
