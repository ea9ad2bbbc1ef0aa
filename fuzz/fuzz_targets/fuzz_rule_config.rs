//! Fuzz target for config and rule-set parsing plus message templates.
//!
//! Goal: parsing, resolution and template rendering should **never panic**.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_config
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use trailguard_settings::{Overrides, RuleSetFormat};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = trailguard_domain::rules::render_template(text, "target", "value", "expected");

    if let Ok(cfg) = trailguard_settings::parse_config_toml(text) {
        let _ = trailguard_settings::resolve_config(cfg, None, Overrides::default());
    }
    let _ = trailguard_settings::parse_rule_set(text, RuleSetFormat::Json);
});
