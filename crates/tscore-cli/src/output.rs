//! Where the report goes and how it gets there.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tscore_model::{ParamKey, ParameterSet};
use tscore_report::{read_report, write_report};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl Destination {
    /// `--output` first, then the parameters' `reportFileName`, then stdout.
    pub fn choose(output: Option<&Path>, params: &ParameterSet) -> Self {
        if let Some(path) = output {
            return Self::File(path.to_path_buf());
        }
        match params.text(ParamKey::ReportFileName) {
            Some(name) if !name.is_empty() => Self::File(PathBuf::from(name)),
            _ => Self::Stdout,
        }
    }

    /// Open the destination for writing. A file is created (or truncated)
    /// right away, so an unusable path fails before any database work.
    pub fn open(&self) -> Result<ReportSink> {
        match self {
            Self::Stdout => Ok(ReportSink::Stdout),
            Self::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("create report file {}", path.display()))?;
                Ok(ReportSink::File {
                    path: path.clone(),
                    file,
                })
            }
        }
    }
}

/// An opened [`Destination`].
#[derive(Debug)]
pub enum ReportSink {
    File { path: PathBuf, file: File },
    Stdout,
}

impl ReportSink {
    /// Copy a report here, see [`copy_report`].
    pub fn write<R: Read>(self, report: R, precision: Option<usize>) -> Result<()> {
        match self {
            Self::Stdout => copy_report(report, io::stdout().lock(), precision),
            Self::File { path, file } => copy_report(report, BufWriter::new(file), precision)
                .with_context(|| format!("write report file {}", path.display())),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdout => f.write_str("<stdout>"),
        }
    }
}

/// Copy the report bytes unchanged, or reformat the rows with a fixed score
/// precision.
pub fn copy_report<R: Read, W: Write>(
    mut report: R,
    mut out: W,
    precision: Option<usize>,
) -> Result<()> {
    match precision {
        None => {
            io::copy(&mut report, &mut out).context("copy report")?;
        }
        Some(digits) => {
            let records = read_report(report).context("parse report")?;
            write_report(&records, &mut out, Some(digits)).context("rewrite report")?;
        }
    }
    out.flush().context("flush report")?;
    Ok(())
}
