//! Use case orchestration for trailguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings,
//! evidence, domain, and render layers. It is intentionally thin and delegates heavy
//! lifting to the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod render;
mod report;
mod verify;

pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use render::{render_annotations, render_markdown, render_text};
pub use report::{parse_report_json, serialize_report, to_renderable, write_artifact};
pub use verify::{
    EXIT_FAIL, EXIT_INCONCLUSIVE, EXIT_INPUT_ERROR, EXIT_PASS, EXIT_SOURCE_ERROR, VerifyInput,
    VerifyOutput, error_exit_code, run_verify, status_exit_code,
};
