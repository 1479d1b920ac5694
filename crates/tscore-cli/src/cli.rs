//! CLI argument definitions.

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use tscore_core::{Overrides, SqlPlusRunner};

#[derive(Parser)]
#[command(
    name = "temporal-score",
    version,
    about = "Score drug-condition pairs for adverse drug event likelihood",
    long_about = "Evaluates the adverse drug event likelihood of drug-condition pairs \
                  using the temporal score and writes each pair with its counts and \
                  score in CSV format.\n\n\
                  Pairs are the Cartesian product of the drug and condition ID lists. \
                  Counting runs on an Oracle database through SQL*Plus."
)]
pub struct Cli {
    /// File with one drug ID per line.
    #[arg(value_name = "DRUG-IDS-FILE")]
    pub drug_ids_file: PathBuf,

    /// File with one condition ID per line.
    #[arg(value_name = "COND-IDS-FILE")]
    pub cond_ids_file: PathBuf,

    /// Parameters file in `name: value` / `name = value` format.
    #[arg(short = 'p', long = "parameters", value_name = "PARAMS-FILE")]
    pub parameters: Option<PathBuf>,

    /// Report destination. Overrides `reportFileName`; default is stdout.
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Oracle connection name. Overrides the parameters file.
    #[arg(long = "db-conn", value_name = "NAME")]
    pub db_conn: Option<String>,

    /// Oracle username. Overrides the parameters file; prompted when missing.
    #[arg(long = "db-user", value_name = "USERNAME")]
    pub db_user: Option<String>,

    /// Oracle password. Overrides the parameters file; prompted when missing.
    #[arg(long = "db-pass", value_name = "PASSWORD")]
    pub db_pass: Option<String>,

    /// Schema for all database operations. Defaults to the username.
    #[arg(long = "db-schema", value_name = "NAME")]
    pub db_schema: Option<String>,

    /// SQL*Plus executable.
    #[arg(long = "sqlplus", value_name = "PROGRAM", default_value = SqlPlusRunner::DEFAULT_PROGRAM)]
    pub sqlplus: PathBuf,

    /// Kill SQL*Plus after this many seconds. Default is to wait indefinitely.
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Rewrite the report with this many decimals in the score column.
    #[arg(long = "precision", value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Print the full error chain on failure.
    #[arg(long = "debug")]
    pub debug: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Connection overrides given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            connection: self.db_conn.clone(),
            user: self.db_user.clone(),
            password: self.db_pass.clone(),
            schema: self.db_schema.clone(),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Command line arguments safe to log: password values are replaced and
/// anything that is not UTF-8 is converted lossily.
pub fn redacted_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut redact_next = false;
    args.into_iter()
        .map(|arg| {
            let arg = arg.as_ref().to_string_lossy().into_owned();
            if redact_next {
                redact_next = false;
                return tscore_model::REDACTED_VALUE.to_string();
            }
            if arg == "--db-pass" {
                redact_next = true;
                arg
            } else if arg.starts_with("--db-pass=") {
                format!("--db-pass={}", tscore_model::REDACTED_VALUE)
            } else {
                arg
            }
        })
        .collect()
}
