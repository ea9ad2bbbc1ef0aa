use crate::model::HashBytes;
use crate::rules::Rule;

/// How strictly the chain verifier treats sequence ids and anchors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainPolicy {
    /// Tolerate skipped sequence ids (ids must still strictly increase).
    pub allow_gaps: bool,

    /// Expected `previous_hash` of the first observed record. When unset the
    /// first record's `previous_hash` is not checked.
    pub genesis: Option<HashBytes>,

    /// Externally anchored chain head the last `current_hash` must equal.
    pub expected_head: Option<HashBytes>,
}

/// Fully resolved configuration for one verification run.
#[derive(Clone, Debug, Default)]
pub struct EffectiveConfig {
    pub profile: String,
    pub chain: ChainPolicy,
    /// Enabled rules, in evaluation order.
    pub rules: Vec<Rule>,
}

impl EffectiveConfig {
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }
}
