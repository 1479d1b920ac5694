//! The temporal score.
//!
//! Compares how often a drug precedes a condition for one specific pair with
//! what the drug's and the condition's general ordering tendencies would
//! predict. Larger values mean the drug precedes the condition more often
//! than those tendencies explain. With no evidence at all every smoothed
//! ratio is 1/2 and the score is 2.

use tscore_model::{PairCounts, Pseudocount};

/// Compute the smoothed temporal score for one pair.
///
/// ```text
/// score = [(d_bef_c + k) / (d_c + 2k)]
///       / ([(d_bef_anyc + k) / (d_anyc + 2k)] * [(anyd_bef_c + k) / (anyd_c + 2k)])
/// ```
///
/// `cond_before_drug` does not enter the formula.
pub fn temporal_score(counts: &PairCounts, pseudocount: Pseudocount) -> f64 {
    let k = pseudocount.get();
    let smoothed = |before: u64, total: u64| (before as f64 + k) / (total as f64 + 2.0 * k);

    let pair = smoothed(counts.drug_before_cond, counts.drug_and_cond);
    let drug = smoothed(counts.drug_before_any_cond, counts.drug_and_any_cond);
    let cond = smoothed(counts.any_drug_before_cond, counts.any_drug_and_cond);
    pair / (drug * cond)
}
