//! Error types for scoring runs.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tscore_model::ModelError;

/// Script template failures. Both variants are raised before anything runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// One or more placeholders have no resolved value.
    #[error("unresolved parameters: {}", names.join(", "))]
    MissingParameters { names: Vec<String> },

    /// A `${` without a valid name and closing brace.
    #[error("malformed placeholder at byte {offset}: {snippet}")]
    Malformed { offset: usize, snippet: String },
}

/// How a failed external tool ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExit {
    /// Exited with a non-zero status code.
    Code(i32),
    /// Terminated by a signal (Unix).
    Signal(i32),
    /// Killed after exceeding the configured timeout.
    TimedOut(Duration),
    /// No exit code and no signal were reported.
    Unknown,
}

impl fmt::Display for ToolExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "failed with code: {code}"),
            Self::Signal(signal) => write!(f, "killed by signal: {signal}"),
            Self::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs_f64()),
            Self::Unknown => f.write_str("terminated abnormally"),
        }
    }
}

/// Failures while running a script through the external tool.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The tool ran but did not succeed. `output` holds everything it wrote.
    #[error("{program} {exit}")]
    ExternalTool {
        program: String,
        exit: ToolExit,
        output: String,
    },

    /// The tool could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Temporary file or pipe handling failed.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl RunnerError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { context, source }
    }

    /// Exit classification, for external tool failures.
    #[must_use]
    pub fn exit(&self) -> Option<ToolExit> {
        match self {
            Self::ExternalTool { exit, .. } => Some(*exit),
            Self::Launch { .. } | Self::Io { .. } => None,
        }
    }

    /// Captured tool output, for external tool failures.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::ExternalTool { output, .. } => Some(output),
            Self::Launch { .. } | Self::Io { .. } => None,
        }
    }
}

/// Parameter resolution failures.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error("failed to read {what}: {source}")]
    Prompt {
        what: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Errors from [`crate::TemporalScorer::compute_scores`].
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{kind} ID list is empty")]
    EmptyIdList { kind: &'static str },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("report file error: {0}")]
    Report(#[from] io::Error),
}

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_exit_messages() {
        let err = RunnerError::ExternalTool {
            program: "sqlplus".to_string(),
            exit: ToolExit::Code(3),
            output: String::new(),
        };
        assert_eq!(err.to_string(), "sqlplus failed with code: 3");
        assert_eq!(err.exit(), Some(ToolExit::Code(3)));

        let err = RunnerError::ExternalTool {
            program: "sqlplus".to_string(),
            exit: ToolExit::Signal(9),
            output: "partial".to_string(),
        };
        assert_eq!(err.to_string(), "sqlplus killed by signal: 9");
        assert_eq!(err.output(), Some("partial"));
    }

    #[test]
    fn test_missing_parameters_lists_names() {
        let err = TemplateError::MissingParameters {
            names: vec!["dbSchemaName".to_string(), "pseudocount".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unresolved parameters: dbSchemaName, pseudocount"
        );
    }

    #[test]
    fn test_launch_has_no_exit() {
        let err = RunnerError::Launch {
            program: "sqlplus".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit(), None);
        assert_eq!(err.output(), None);
    }
}
