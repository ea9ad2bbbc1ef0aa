//! Explain registry for verifiers and violation codes.
//!
//! Maps verifier IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a verifier or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the verifier/code.
    pub title: &'static str,
    /// What the verifier does and why it exists.
    pub description: &'static str,
    /// How to remediate violations.
    pub remediation: &'static str,
    /// Before/after evidence examples.
    pub examples: ExamplePair,
}

/// Before and after evidence examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Evidence that would produce a violation.
    pub before: &'static str,
    /// Evidence that passes.
    pub after: &'static str,
}

/// Look up an explanation by verifier ID or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Verifiers
        ids::VERIFIER_CHAIN_INTEGRITY => Some(explain_chain_integrity()),
        ids::VERIFIER_POLICY_COMPLIANCE => Some(explain_policy_compliance()),

        // Codes
        ids::CODE_CHAIN_BREAK => Some(explain_chain_break()),
        ids::CODE_ORDERING => Some(explain_ordering()),
        ids::CODE_SEQUENCE_GAP => Some(explain_sequence_gap()),
        ids::CODE_NO_RECORDS => Some(explain_no_records()),
        ids::CODE_HEAD_MISMATCH => Some(explain_head_mismatch()),
        ids::CODE_RULE_VIOLATED => Some(explain_rule_violated()),
        ids::CODE_MISSING_EVIDENCE => Some(explain_missing_evidence()),
        ids::CODE_EVALUATION_ERROR => Some(explain_evaluation_error()),

        _ => None,
    }
}

/// List all known verifier IDs.
pub fn all_verifier_ids() -> &'static [&'static str] {
    &[ids::VERIFIER_CHAIN_INTEGRITY, ids::VERIFIER_POLICY_COMPLIANCE]
}

/// List all known violation codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_CHAIN_BREAK,
        ids::CODE_ORDERING,
        ids::CODE_SEQUENCE_GAP,
        ids::CODE_NO_RECORDS,
        ids::CODE_HEAD_MISMATCH,
        ids::CODE_RULE_VIOLATED,
        ids::CODE_MISSING_EVIDENCE,
        ids::CODE_EVALUATION_ERROR,
    ]
}

// --- Verifier-level explanations ---

fn explain_chain_integrity() -> Explanation {
    Explanation {
        title: "Audit Chain Integrity",
        description: "\
Walks an append-only audit trail in sequence order and checks that every record
embeds the hash of the record before it (`previous_hash == prior current_hash`).

The verifier checks linkage only. It never recomputes a record's own hash from
its content; that hash is produced by the evidence source. An edit to any past
record changes its hash, so the next record's `previous_hash` stops matching
unless every later hash is recomputed as well.

The walk stops at the first broken link: records after it have undefined
provenance and are not reported individually.",
        remediation: "\
Treat any failure as a potential tampering incident:
- Preserve the exported evidence and the database binlogs as-is
- Compare the reported sequence id against the off-host anchored chain head
- Restore the affected table from the last verified backup if tampering is confirmed",
        examples: ExamplePair {
            before: r#"{"id":1,"prev_hash":null,"curr_hash":"aa01"}
{"id":2,"prev_hash":"ffff","curr_hash":"aa02"}"#,
            after: r#"{"id":1,"prev_hash":null,"curr_hash":"aa01"}
{"id":2,"prev_hash":"aa01","curr_hash":"aa02"}"#,
        },
    }
}

fn explain_policy_compliance() -> Explanation {
    Explanation {
        title: "Configuration Policy Compliance",
        description: "\
Evaluates a declarative rule set against a captured configuration snapshot
(a flat JSON object of server variables).

Every rule is evaluated, even after a violation, so one run surfaces every
misconfiguration. A rule whose target variable is absent from the snapshot is
a violation: absence of evidence is never treated as compliance.",
        remediation: "\
Fix each reported variable on the server (or in its configuration file),
re-collect the snapshot, and re-run verification.",
        examples: ExamplePair {
            before: r#"{"require_secure_transport":"OFF","local_infile":"ON"}"#,
            after: r#"{"require_secure_transport":"ON","local_infile":"OFF"}"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_chain_break() -> Explanation {
    Explanation {
        title: "Chain Break",
        description: "\
A record's `previous_hash` does not equal the `current_hash` of the record
before it. Either that record or its predecessor was modified, inserted, or
deleted after it was appended.",
        remediation: "\
Investigate the reported sequence id and its predecessor. The violation data
carries both the expected and the observed hash.",
        examples: ExamplePair {
            before: r#"{"id":2,"prev_hash":"WRONG","curr_hash":"aa02"}"#,
            after: r#"{"id":2,"prev_hash":"aa01","curr_hash":"aa02"}"#,
        },
    }
}

fn explain_ordering() -> Explanation {
    Explanation {
        title: "Sequence Ordering Violation",
        description: "\
A record's sequence id is not strictly greater than the previous record's.
Records must arrive sorted ascending by sequence id; duplicates and reversals
indicate corruption or a tampered export.",
        remediation: "\
Re-export the trail with `ORDER BY id`. If the export is already ordered, the
underlying table contains duplicate or rewritten ids.",
        examples: ExamplePair {
            before: "id=3\nid=2",
            after: "id=2\nid=3",
        },
    }
}

fn explain_sequence_gap() -> Explanation {
    Explanation {
        title: "Sequence Gap",
        description: "\
A sequence id was skipped between two consecutive records. Deleting a record
from the middle of the trail leaves exactly this shape.",
        remediation: "\
Confirm whether the gap comes from a rolled-back insert. If gaps are expected
for this source, set `allow_gaps = true` in the `[chain]` section.",
        examples: ExamplePair {
            before: "id=1\nid=3",
            after: "id=1\nid=2\nid=3",
        },
    }
}

fn explain_no_records() -> Explanation {
    Explanation {
        title: "No Records Observed",
        description: "\
The audit trail contained no records, so nothing could be verified. The result
is INCONCLUSIVE rather than PASS: an empty trail is itself suspicious for a
system expected to have continuous activity.",
        remediation: "\
Check that the export query targets the right table and that auditing triggers
are installed.",
        examples: ExamplePair {
            before: "(empty export)",
            after: r#"{"id":1,"prev_hash":null,"curr_hash":"aa01"}"#,
        },
    }
}

fn explain_head_mismatch() -> Explanation {
    Explanation {
        title: "Chain Head Mismatch",
        description: "\
The chain links correctly, but its last `current_hash` differs from the
externally anchored chain head. Records were appended, truncated, or the whole
chain was recomputed since the head was anchored.",
        remediation: "\
Compare the observed head in the report metadata with the anchored value in
WORM storage and with the records appended since the anchor was taken.",
        examples: ExamplePair {
            before: "expected_head = \"aa02\"  # last record curr_hash = \"bb02\"",
            after: "expected_head = \"aa02\"  # last record curr_hash = \"aa02\"",
        },
    }
}

fn explain_rule_violated() -> Explanation {
    Explanation {
        title: "Rule Violated",
        description: "\
A configuration variable's observed value does not satisfy the rule's
requirement (equals, not_equals, contains_token or contains).",
        remediation: "\
Set the variable to the required value and re-collect the snapshot.",
        examples: ExamplePair {
            before: r#"{"local_infile":"ON"}"#,
            after: r#"{"local_infile":"OFF"}"#,
        },
    }
}

fn explain_missing_evidence() -> Explanation {
    Explanation {
        title: "Missing Evidence",
        description: "\
A rule's target variable is absent from the snapshot. The rule is reported as
violated because it could not be shown to hold.",
        remediation: "\
Add the variable to the collector's `SHOW VARIABLES` filter, or disable the
rule if it does not apply to this server.",
        examples: ExamplePair {
            before: r#"{"local_infile":"OFF"}"#,
            after: r#"{"local_infile":"OFF","skip_name_resolve":"ON"}"#,
        },
    }
}

fn explain_evaluation_error() -> Explanation {
    Explanation {
        title: "Rule Evaluation Error",
        description: "\
The rule itself is malformed (no target, an empty expected value for a
containment operator, or an unknown placeholder in its message). It is
reported as a violation so one bad rule cannot abort the run.",
        remediation: "\
Fix the rule definition in the rule-set file or `trailguard.toml`.",
        examples: ExamplePair {
            before: "[[rule]]\nid = \"x\"\ntarget = []\noperator = \"equals\"\nexpected = \"ON\"",
            after: "[[rule]]\nid = \"x\"\ntarget = \"local_infile\"\noperator = \"equals\"\nexpected = \"OFF\"",
        },
    }
}
