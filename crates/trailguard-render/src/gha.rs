use crate::{RenderableReport, RenderableStatus};

/// Render violations as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} title={source}::{code}: {detail}`
///
/// FAIL sections produce `error` annotations; INCONCLUSIVE sections produce `warning`.
/// At most `max` annotations are emitted.
pub fn render_github_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    let mut out = Vec::new();

    for section in &report.sections {
        let level = match section.status {
            RenderableStatus::Fail => "error",
            RenderableStatus::Inconclusive => "warning",
            RenderableStatus::Pass => "notice",
        };

        for v in &section.violations {
            if out.len() >= max {
                return out;
            }
            let message = escape_data(&format!("{}: {}", v.code, v.detail));
            let title = escape_property(&format!("trailguard {}", v.source));
            out.push(format!("::{} title={}::{}", level, title, message));
        }
    }

    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
