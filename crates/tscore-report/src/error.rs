use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to parse report: {0}")]
    Csv(#[from] csv::Error),

    #[error("report line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("report line {line}: invalid {column} value '{value}'")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
