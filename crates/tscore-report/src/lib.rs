//! Temporal score CSV reports.
//!
//! Reports have no header and no quoting. Columns follow
//! [`tscore_model::REPORT_COLUMNS`]; rows are sorted by drug, then
//! condition.

pub mod error;
pub mod read;
pub mod write;

pub use error::{ReportError, Result};
pub use read::read_report;
pub use write::write_report;
