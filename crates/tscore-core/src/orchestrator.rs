//! One scoring run: render the script, run it, hand back the report.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, info, instrument};
use tscore_model::{IdList, ParamKey, ParameterSet};

use crate::error::{Result, ScoreError, TemplateError};
use crate::resolver;
use crate::runner::{ConnectionTarget, ExecutionResult, ScriptRunner};
use crate::template::ScriptTemplate;

/// Keys the runner needs that the script itself does not reference.
const CONNECTION_KEYS: [ParamKey; 2] = [ParamKey::DbConnectionName, ParamKey::DbUser];

/// The report written by one run, open for reading from the start.
///
/// The file is deleted when the handle is dropped.
#[derive(Debug)]
pub struct ReportHandle {
    reader: File,
    path: TempPath,
}

impl ReportHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for ReportHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct ScoreRun {
    pub report: ReportHandle,
    /// What the external tool printed, kept for diagnostics.
    pub script_output: ExecutionResult,
}

/// Computes temporal scores through a [`ScriptRunner`].
#[derive(Debug)]
pub struct TemporalScorer<R> {
    runner: R,
    template: ScriptTemplate,
}

impl<R: ScriptRunner> TemporalScorer<R> {
    /// Use the bundled temporal score script.
    pub fn new(runner: R) -> Self {
        Self::with_template(runner, ScriptTemplate::temporal_score())
    }

    pub fn with_template(runner: R, template: ScriptTemplate) -> Self {
        Self { runner, template }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn template(&self) -> &ScriptTemplate {
        &self.template
    }

    /// Score every (drug, condition) pair.
    ///
    /// `parameters` is copied; the report path and both ID tuples are set on
    /// the copy only. Everything that can be checked locally is checked
    /// before the runner is invoked.
    #[instrument(skip_all, fields(drugs = drug_ids.len(), conditions = cond_ids.len()))]
    pub fn compute_scores(
        &self,
        drug_ids: &IdList,
        cond_ids: &IdList,
        parameters: &ParameterSet,
    ) -> Result<ScoreRun> {
        if drug_ids.is_empty() {
            return Err(ScoreError::EmptyIdList { kind: "drug" });
        }
        if cond_ids.is_empty() {
            return Err(ScoreError::EmptyIdList { kind: "condition" });
        }

        let mut params = parameters.clone();
        let report = tempfile::Builder::new()
            .prefix("tscore-report-")
            .suffix(".csv")
            .tempfile()?
            .into_temp_path();
        debug!(path = %report.display(), "Created report file");
        params.set(
            ParamKey::ReportFileName,
            report.to_string_lossy().into_owned(),
        );
        params.set(ParamKey::DrugIdsTuple, drug_ids.to_tuple_literal());
        params.set(ParamKey::CondIdsTuple, cond_ids.to_tuple_literal());

        let mut missing = self.template.missing(&params);
        for key in CONNECTION_KEYS {
            if params.is_unset(key) && !missing.iter().any(|name| name == key.as_str()) {
                missing.push(key.as_str().to_string());
            }
        }
        if !missing.is_empty() {
            return Err(TemplateError::MissingParameters { names: missing }.into());
        }
        resolver::validate(&params)?;

        let script = self.template.render(&params)?;
        let target = ConnectionTarget::new(
            params.text(ParamKey::DbConnectionName).unwrap_or_default(),
            params.text(ParamKey::DbUser).unwrap_or_default(),
        );
        info!(
            "Computing temporal scores for {} drugs x {} conditions",
            drug_ids.len(),
            cond_ids.len()
        );
        let script_output = self.runner.run(&target, &params.secret(), &script)?;

        // Reopened by path: the tool may have replaced the file.
        let reader = File::open(&report)?;
        Ok(ScoreRun {
            report: ReportHandle {
                reader,
                path: report,
            },
            script_output,
        })
    }
}
