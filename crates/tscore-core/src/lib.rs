//! Temporal score orchestration.
//!
//! Resolves parameters, renders the bundled SQL*Plus script for two ID
//! lists, runs it through a [`ScriptRunner`], and returns the report the
//! script writes. The score formula and an in-memory reference counter live
//! here too.

pub mod error;
pub mod formula;
pub mod orchestrator;
pub mod reference;
pub mod resolver;
pub mod runner;
pub mod template;

pub use error::{ParameterError, Result, RunnerError, ScoreError, TemplateError, ToolExit};
pub use formula::temporal_score;
pub use orchestrator::{ReportHandle, ScoreRun, TemporalScorer};
pub use reference::{CohortWindow, EraRecord, compute_counts};
pub use resolver::{CredentialPrompt, Overrides, ParameterResolver};
pub use runner::{
    ConnectionTarget, ExecutionResult, ScriptRunner, SqlPlusRunner, Termination,
};
pub use template::{ScriptTemplate, TEMPORAL_SCORE_SQL};
