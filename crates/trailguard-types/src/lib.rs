//! Stable DTOs and IDs used across the trailguard workspace.
//!
//! This crate is intentionally boring:
//! - the compliance report every verifier produces
//! - the persisted report envelope
//! - stable string IDs and violation codes
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod report;

pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use report::{
    ComplianceReport, ReportEnvelope, ReportMetadata, RunMeta, Status, ToolMeta, Violation,
    SCHEMA_REPORT_V1,
};
