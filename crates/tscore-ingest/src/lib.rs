//! Input parsing for the temporal score pipeline.
//!
//! - [`config`]: line-oriented `name: value` / `name = value` parameter files
//! - [`ids`]: one-identifier-per-line drug and condition lists

pub mod config;
pub mod error;
pub mod ids;

pub use config::{ParsedConfig, SkippedLine, parse_config, parse_config_str};
pub use error::{IngestError, Result};
pub use ids::{parse_id_line, parse_ids, read_id_file};
