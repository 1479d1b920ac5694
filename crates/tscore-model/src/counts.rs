//! Per-pair counts and the report row they produce.

use std::fmt;

use crate::error::{ModelError, Result};
use crate::ids::Id;

/// Report columns, in output order.
pub const REPORT_COLUMNS: [&str; 13] = [
    "drug",
    "cond",
    "ct_d_bef_c",
    "ct_c_bef_d",
    "ct_d_c",
    "ct_d_bef_anyc",
    "ct_d_anyc",
    "ct_anyd_bef_c",
    "ct_anyd_c",
    "ct_d",
    "ct_c",
    "ct_ppl",
    "temporal_score",
];

/// Distinct-person counts for one (drug, condition) pair.
///
/// "Before" means the first drug occurrence is strictly earlier than the
/// first condition occurrence. Counts only consider people whose condition
/// falls inside the configured window around the drug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    /// `ct_d_bef_c`
    pub drug_before_cond: u64,
    /// `ct_c_bef_d`
    pub cond_before_drug: u64,
    /// `ct_d_c`
    pub drug_and_cond: u64,
    /// `ct_d_bef_anyc`
    pub drug_before_any_cond: u64,
    /// `ct_d_anyc`
    pub drug_and_any_cond: u64,
    /// `ct_anyd_bef_c`
    pub any_drug_before_cond: u64,
    /// `ct_anyd_c`
    pub any_drug_and_cond: u64,
}

impl PairCounts {
    /// Build from the seven counts in report column order.
    pub const fn from_columns(columns: [u64; 7]) -> Self {
        Self {
            drug_before_cond: columns[0],
            cond_before_drug: columns[1],
            drug_and_cond: columns[2],
            drug_before_any_cond: columns[3],
            drug_and_any_cond: columns[4],
            any_drug_before_cond: columns[5],
            any_drug_and_cond: columns[6],
        }
    }

    pub const fn to_columns(&self) -> [u64; 7] {
        [
            self.drug_before_cond,
            self.cond_before_drug,
            self.drug_and_cond,
            self.drug_before_any_cond,
            self.drug_and_any_cond,
            self.any_drug_before_cond,
            self.any_drug_and_cond,
        ]
    }
}

/// One report row.
#[derive(Debug, Clone, PartialEq)]
pub struct CountRecord {
    pub drug: Id,
    pub cond: Id,
    pub pair: PairCounts,
    /// `ct_d`: people with the drug.
    pub drug_total: u64,
    /// `ct_c`: people with the condition.
    pub cond_total: u64,
    /// `ct_ppl`: people with any listed drug or condition.
    pub population: u64,
    pub temporal_score: f64,
}

impl CountRecord {
    /// The ten integer count columns in report order.
    pub fn count_columns(&self) -> [u64; 10] {
        let pair = self.pair.to_columns();
        [
            pair[0],
            pair[1],
            pair[2],
            pair[3],
            pair[4],
            pair[5],
            pair[6],
            self.drug_total,
            self.cond_total,
            self.population,
        ]
    }
}

/// Laplace smoothing constant used by the score formula.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pseudocount(f64);

impl Pseudocount {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidPseudocount(value.to_string()))
        }
    }

    /// Parse a pseudocount from parameter text.
    pub fn parse(text: &str) -> Result<Self> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| ModelError::InvalidPseudocount(text.to_string()))?;
        Self::new(value)
    }

    pub const fn get(&self) -> f64 {
        self.0
    }
}

impl Default for Pseudocount {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for Pseudocount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
