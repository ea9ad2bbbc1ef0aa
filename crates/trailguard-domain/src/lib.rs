//! Pure evidence verification (no IO).
//!
//! Input: audit records or a configuration snapshot, already materialized by an adapter.
//! Output: one `ComplianceReport` per verifier run.

#![forbid(unsafe_code)]

pub mod error;
pub mod fingerprint;
pub mod model;
pub mod policy;
pub mod rules;

mod chain;
mod verifier;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use chain::{verify_chain, verify_chain_at, ChainWalker};
pub use error::VerifyError;
pub use rules::{evaluate_policy, evaluate_policy_at};
pub use verifier::{combined_status, ChainVerifier, PolicyVerifier, Verifier};
