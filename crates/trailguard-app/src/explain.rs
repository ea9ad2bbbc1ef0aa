//! The `explain` use case: look up verifier/code documentation.

use trailguard_types::explain::{self, Explanation};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown identifier; includes available verifier IDs and codes.
    NotFound {
        identifier: String,
        available_verifier_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

/// Look up an explanation for a verifier ID or violation code.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_verifier_ids: explain::all_verifier_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\n");
    out.push_str("Examples\n");
    out.push_str("--------\n\n");
    push_example(&mut out, "Before (violation):", exp.examples.before);
    out.push('\n');
    push_example(&mut out, "After (compliant):", exp.examples.after);

    out
}

fn push_example(out: &mut String, label: &str, body: &str) {
    out.push_str(label);
    out.push('\n');
    out.push_str("```text\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
}

/// Format the "not found" message for terminal display.
pub fn format_not_found(
    identifier: &str,
    verifier_ids: &[&'static str],
    codes: &[&'static str],
) -> String {
    let mut out = format!("Unknown verifier or code: {identifier}\n\n");
    out.push_str("Available verifiers:\n");
    for id in verifier_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out.push_str("\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }
    out
}
