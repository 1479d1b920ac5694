//! Data model for the temporal score pipeline.
//!
//! Holds the types shared across the workspace: the resolved
//! [`ParameterSet`] that drives script rendering, drug and condition
//! identifiers, and the per-pair [`CountRecord`] rows of a report.

pub mod counts;
pub mod error;
pub mod ids;
pub mod params;

pub use counts::{CountRecord, PairCounts, Pseudocount, REPORT_COLUMNS};
pub use error::{ModelError, Result};
pub use ids::{Id, IdList};
pub use params::{ParamKey, ParamValue, ParameterSet, REDACTED_VALUE, Secret};
