use crate::{RenderableReport, RenderableSection, RenderableStatus, RenderableViolation};

pub fn failing_report() -> RenderableReport {
    RenderableReport {
        status: RenderableStatus::Fail,
        sections: vec![
            RenderableSection {
                verifier: "audit.chain_integrity".to_string(),
                status: RenderableStatus::Fail,
                facts: vec![
                    ("Records observed".to_string(), "2".to_string()),
                    ("Chain head".to_string(), "`aa11`".to_string()),
                ],
                violations: vec![RenderableViolation {
                    source: "audit.chain_integrity".to_string(),
                    code: "chain_break".to_string(),
                    detail: "hash chain broken at sequence id 2".to_string(),
                }],
            },
            RenderableSection {
                verifier: "policy.compliance".to_string(),
                status: RenderableStatus::Fail,
                facts: vec![("Rules evaluated".to_string(), "4".to_string())],
                violations: vec![
                    RenderableViolation {
                        source: "mysql.require_secure_transport".to_string(),
                        code: "rule_violated".to_string(),
                        detail: "require_secure_transport must be ON (observed 'OFF')".to_string(),
                    },
                    RenderableViolation {
                        source: "mysql.skip_name_resolve".to_string(),
                        code: "missing_evidence".to_string(),
                        detail: "missing evidence: variable 'skip_name_resolve' not present in snapshot"
                            .to_string(),
                    },
                ],
            },
        ],
    }
}

pub fn passing_report() -> RenderableReport {
    RenderableReport {
        status: RenderableStatus::Pass,
        sections: vec![RenderableSection {
            verifier: "policy.compliance".to_string(),
            status: RenderableStatus::Pass,
            facts: vec![("Rules evaluated".to_string(), "4".to_string())],
            violations: Vec::new(),
        }],
    }
}
