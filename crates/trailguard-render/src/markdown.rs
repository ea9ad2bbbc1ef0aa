use crate::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Trailguard report\n\n");
    out.push_str(&format!(
        "- Status: **{}**\n- Violations: {}\n",
        report.status.as_str(),
        report.violation_count()
    ));

    if report.sections.is_empty() {
        out.push_str("\nNo verifiers ran.\n");
        return out;
    }

    for section in &report.sections {
        out.push_str(&format!(
            "\n## {}: {}\n\n",
            section.verifier,
            section.status.as_str()
        ));

        for (label, value) in &section.facts {
            out.push_str(&format!("- {}: {}\n", label, value));
        }
        if !section.facts.is_empty() {
            out.push('\n');
        }

        if section.violations.is_empty() {
            out.push_str("No violations.\n");
            continue;
        }

        out.push_str("Violations:\n\n");
        for v in &section.violations {
            out.push_str(&format!("- `{}` / `{}`: {}\n", v.source, v.code, v.detail));
        }
    }

    out
}
