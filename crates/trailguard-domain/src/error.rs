use trailguard_types::ids;

/// Errors that stop a verification run before any report exists.
///
/// Compliance outcomes (breaks, ordering, missing evidence) are never errors;
/// they are violations inside a report.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Evidence is malformed: bad hex, inconsistent hash length, unparseable row.
    #[error("input error: {0}")]
    Input(String),

    /// Reading the evidence source failed.
    #[error("source error: {context}")]
    Source {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl VerifyError {
    pub fn input(message: impl Into<String>) -> Self {
        VerifyError::Input(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        VerifyError::Source {
            context: context.into(),
            source,
        }
    }

    /// Stable snake_case code for this error class.
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::Input(_) => ids::CODE_INPUT_ERROR,
            VerifyError::Source { .. } => ids::CODE_SOURCE_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn codes_distinguish_input_from_source() {
        let input = VerifyError::input("bad hex");
        assert_eq!(input.code(), "input_error");
        assert_eq!(input.to_string(), "input error: bad hex");

        let source = VerifyError::io(
            "read audit.jsonl",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"),
        );
        assert_eq!(source.code(), "source_error");
        assert!(source.source().is_some());
    }
}
