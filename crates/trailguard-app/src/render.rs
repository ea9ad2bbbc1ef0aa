//! Render use cases: markdown, GitHub annotations and text lines from in-memory reports.

use trailguard_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    trailguard_render::render_markdown(report)
}

pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    trailguard_render::render_github_annotations(report, max)
}

pub fn render_text(report: &RenderableReport) -> Vec<String> {
    trailguard_render::render_text_lines(report)
}
