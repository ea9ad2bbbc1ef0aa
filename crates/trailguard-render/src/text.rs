use crate::RenderableReport;

/// One `[source] code: detail` line per violation, in report order.
pub fn render_text_lines(report: &RenderableReport) -> Vec<String> {
    report
        .sections
        .iter()
        .flat_map(|s| s.violations.iter())
        .map(|v| format!("[{}] {}: {}", v.source, v.code, v.detail))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failing_report, passing_report};

    #[test]
    fn one_line_per_violation() {
        let lines = render_text_lines(&failing_report());
        assert_eq!(
            lines,
            vec![
                "[audit.chain_integrity] chain_break: hash chain broken at sequence id 2",
                "[mysql.require_secure_transport] rule_violated: require_secure_transport must be ON (observed 'OFF')",
                "[mysql.skip_name_resolve] missing_evidence: missing evidence: variable 'skip_name_resolve' not present in snapshot",
            ]
        );
        assert!(render_text_lines(&passing_report()).is_empty());
    }
}
