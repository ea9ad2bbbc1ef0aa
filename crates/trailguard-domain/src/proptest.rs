//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Chain linkage acceptance and first-break locality
//! - Rule order independence
//! - Idempotence of both verifiers

use crate::chain::verify_chain_at;
use crate::model::{ConfigurationSnapshot, HashBytes};
use crate::policy::ChainPolicy;
use crate::rules::{evaluate_policy_at, mysql_baseline_rules, Operator, Rule};
use crate::test_support::{checked_at, linked_chain, ok_records};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::BTreeSet;
use trailguard_types::{ids, Status};

// ============================================================================
// Strategies
// ============================================================================

/// Snapshot over the baseline variables, each possibly absent or insecure.
fn arb_baseline_snapshot() -> impl Strategy<Value = ConfigurationSnapshot> {
    let on_off = || {
        prop_oneof![
            Just(None),
            Just(Some("ON".to_string())),
            Just(Some("OFF".to_string())),
            Just(Some("on".to_string())),
        ]
    };
    let sql_mode = prop_oneof![
        Just(None),
        Just(Some("STRICT_ALL_TABLES".to_string())),
        Just(Some("NO_ZERO_DATE,STRICT_ALL_TABLES".to_string())),
        Just(Some("STRICT_TRANS_TABLES".to_string())),
        Just(Some(String::new())),
    ];
    (on_off(), on_off(), on_off(), sql_mode).prop_map(|(rst, lif, snr, mode)| {
        let pairs = [
            ("require_secure_transport", rst),
            ("local_infile", lif),
            ("skip_name_resolve", snr),
            ("sql_mode", mode),
        ];
        ConfigurationSnapshot::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v))),
        )
    })
}

/// Baseline rules plus a few extra ones, including a malformed rule.
fn all_rules() -> Vec<Rule> {
    let mut rules = mysql_baseline_rules();
    rules.push(Rule::new("extra.no_old_tls", "tls_version", Operator::NotEquals, "TLSv1"));
    rules.push(Rule::new("extra.broken", "sql_mode", Operator::Contains, ""));
    rules
}

fn violated_sources(report: &trailguard_types::ComplianceReport) -> BTreeSet<String> {
    report
        .violations()
        .iter()
        .map(|v| v.source.clone())
        .collect()
}

// ============================================================================
// Chain properties
// ============================================================================

proptest! {
    #[test]
    fn consistent_chain_passes(first in 0u64..1_000_000, len in 1u64..64) {
        let records = linked_chain(first, first + len - 1);
        let report = verify_chain_at(ok_records(records), &ChainPolicy::default(), checked_at()).unwrap();
        prop_assert_eq!(report.status(), Status::Pass);
        prop_assert!(report.violations().is_empty());
        prop_assert_eq!(report.metadata().records_observed, Some(len));
    }

    #[test]
    fn single_break_is_located_and_nothing_after_is_pulled(
        len in 2u64..64,
        pick in any::<prop::sample::Index>(),
        junk in prop::collection::vec(any::<u8>(), 32),
    ) {
        let mut records = linked_chain(1, len);
        // Never break the first record: its previous hash is unchecked.
        let k = 1 + pick.index((len - 1) as usize);
        let tampered = HashBytes::from_bytes(junk);
        prop_assume!(tampered != records[k - 1].current_hash);
        records[k].previous_hash = tampered;
        let break_seq = records[k].sequence_id;

        let pulled = Cell::new(0usize);
        let source = records.into_iter().map(|r| {
            pulled.set(pulled.get() + 1);
            Ok(r)
        });
        let report = verify_chain_at(source, &ChainPolicy::default(), checked_at()).unwrap();

        prop_assert_eq!(report.status(), Status::Fail);
        prop_assert_eq!(report.violations().len(), 1);
        let v = &report.violations()[0];
        prop_assert_eq!(v.code.as_str(), ids::CODE_CHAIN_BREAK);
        prop_assert_eq!(v.data["sequence_id"].as_u64(), Some(break_seq));
        prop_assert_eq!(pulled.get(), k + 1);
    }

    #[test]
    fn chain_verification_is_idempotent(len in 0u64..32, break_at in prop::option::of(1usize..32)) {
        let mut records = linked_chain(1, len);
        if let Some(k) = break_at.filter(|k| *k < records.len()) {
            records[k].previous_hash = HashBytes::from_bytes(vec![0u8; 32]);
        }
        let a = verify_chain_at(ok_records(records.clone()), &ChainPolicy::default(), checked_at()).unwrap();
        let b = verify_chain_at(ok_records(records), &ChainPolicy::default(), checked_at()).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ============================================================================
// Policy properties
// ============================================================================

proptest! {
    #[test]
    fn rule_order_changes_only_violation_order(
        snapshot in arb_baseline_snapshot(),
        shuffled in Just(all_rules()).prop_shuffle(),
    ) {
        let base = evaluate_policy_at(&snapshot, &all_rules(), checked_at());
        let permuted = evaluate_policy_at(&snapshot, &shuffled, checked_at());

        prop_assert_eq!(base.status(), permuted.status());
        prop_assert_eq!(violated_sources(&base), violated_sources(&permuted));
        prop_assert_eq!(base.violations().len(), permuted.violations().len());
    }

    #[test]
    fn policy_evaluation_is_idempotent(snapshot in arb_baseline_snapshot()) {
        let rules = all_rules();
        let a = evaluate_policy_at(&snapshot, &rules, checked_at());
        let b = evaluate_policy_at(&snapshot, &rules, checked_at());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn policy_never_inconclusive(snapshot in arb_baseline_snapshot()) {
        let report = evaluate_policy_at(&snapshot, &mysql_baseline_rules(), checked_at());
        prop_assert_ne!(report.status(), Status::Inconclusive);
        prop_assert_eq!(report.status() == Status::Pass, report.violations().is_empty());
    }
}
