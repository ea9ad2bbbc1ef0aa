#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableStatus {
    Pass,
    Inconclusive,
    Fail,
}

impl RenderableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderableStatus::Pass => "PASS",
            RenderableStatus::Inconclusive => "INCONCLUSIVE",
            RenderableStatus::Fail => "FAIL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableViolation {
    pub source: String,
    pub code: String,
    pub detail: String,
}

/// One verifier's outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableSection {
    pub verifier: String,
    pub status: RenderableStatus,
    /// Labelled facts about the evidence, in display order.
    pub facts: Vec<(String, String)>,
    pub violations: Vec<RenderableViolation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub status: RenderableStatus,
    pub sections: Vec<RenderableSection>,
}

impl RenderableReport {
    pub fn violation_count(&self) -> usize {
        self.sections.iter().map(|s| s.violations.len()).sum()
    }
}
