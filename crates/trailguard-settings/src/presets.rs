use trailguard_domain::policy::{ChainPolicy, EffectiveConfig};
use trailguard_domain::rules::mysql_baseline_rules;

pub const PROFILE_MYSQL_BASELINE: &str = "mysql-baseline";
pub const PROFILE_EMPTY: &str = "empty";
pub const DEFAULT_PROFILE: &str = PROFILE_MYSQL_BASELINE;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything site-specific goes into a rule-set file.
pub fn preset(profile: &str) -> anyhow::Result<EffectiveConfig> {
    match profile {
        PROFILE_MYSQL_BASELINE => Ok(EffectiveConfig {
            profile: PROFILE_MYSQL_BASELINE.to_string(),
            chain: ChainPolicy::default(),
            rules: mysql_baseline_rules(),
        }),
        PROFILE_EMPTY => Ok(EffectiveConfig {
            profile: PROFILE_EMPTY.to_string(),
            chain: ChainPolicy::default(),
            rules: Vec::new(),
        }),
        other => anyhow::bail!(
            "unknown profile: {other} (expected '{PROFILE_MYSQL_BASELINE}' or '{PROFILE_EMPTY}')"
        ),
    }
}
