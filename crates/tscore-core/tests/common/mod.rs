//! Reference cohort shared by the integration tests.
//!
//! Eleven people, two drugs (773, 797) and three conditions (421, 443, 479).
//! Causal structure: 421 -> 773 -> 443 and 479 -> 797.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeDelta};
use tscore_core::EraRecord;
use tscore_model::{Id, IdList};

pub const DRUG_IDS: [u64; 2] = [773, 797];
pub const COND_IDS: [u64; 3] = [421, 443, 479];
pub const EXTRA_DRUG: u64 = 701;
pub const EXTRA_COND: u64 = 499;

/// Era start days per person, relative to 2002-02-20, in (concept, day) form.
const TIMELINES: [&[(u64, i64)]; 11] = [
    &[(443, 406), (479, 470), (479, 593), (421, 720), (797, 720), (479, 720), (797, 858), (479, 927)],
    &[(773, 486), (443, 507), (421, 514), (773, 514)],
    &[(421, 47), (443, 154)],
    &[(797, 485), (797, 599), (773, 762)],
    &[(773, 647), (797, 758)],
    &[(797, 323), (443, 436)],
    &[(421, 383), (773, 409)],
    &[(421, 400), (421, 400), (421, 423), (421, 444)],
    &[(773, 199), (443, 206), (479, 385), (443, 526), (773, 663)],
    &[(443, 434), (421, 434)],
    &[(797, 233), (773, 357), (421, 464)],
];

/// Expected report for the reference lists, scores at two decimals.
pub const REFERENCE_TABLE: &str = "\
773,421,2,1,3,3,4,2,4,6,7,11,1.80
773,443,2,0,2,3,4,3,4,6,6,11,1.69
773,479,1,0,1,3,4,1,2,6,2,11,2.00
797,421,1,1,2,2,3,2,4,5,7,11,1.67
797,443,1,1,2,2,3,3,4,5,6,11,1.25
797,479,0,1,1,2,3,1,2,5,2,11,1.11
";

/// Expected report with one extra drug and one extra condition that have no
/// data: the full 3 x 4 product.
pub const EXTENDED_TABLE: &str = "\
701,421,0,0,0,0,0,2,4,0,7,11,2.00
701,443,0,0,0,0,0,3,4,0,6,11,1.50
701,479,0,0,0,0,0,1,2,0,2,11,2.00
701,499,0,0,0,0,0,0,0,0,0,11,2.00
773,421,2,1,3,3,4,2,4,6,7,11,1.80
773,443,2,0,2,3,4,3,4,6,6,11,1.69
773,479,1,0,1,3,4,1,2,6,2,11,2.00
773,499,0,0,0,3,4,0,0,6,0,11,1.50
797,421,1,1,2,2,3,2,4,5,7,11,1.67
797,443,1,1,2,2,3,3,4,5,6,11,1.25
797,479,0,1,1,2,3,1,2,5,2,11,1.11
797,499,0,0,0,2,3,0,0,5,0,11,1.67
";

pub fn ids(values: &[u64]) -> IdList {
    values.iter().copied().map(Id::from).collect()
}

pub fn drug_ids() -> IdList {
    ids(&DRUG_IDS)
}

pub fn cond_ids() -> IdList {
    ids(&COND_IDS)
}

pub fn extended_drug_ids() -> IdList {
    ids(&[DRUG_IDS[0], DRUG_IDS[1], EXTRA_DRUG])
}

pub fn extended_cond_ids() -> IdList {
    ids(&[COND_IDS[0], COND_IDS[1], COND_IDS[2], EXTRA_COND])
}

/// Drug eras and condition eras of the reference cohort.
pub fn cohort() -> (Vec<EraRecord>, Vec<EraRecord>) {
    let origin = NaiveDate::from_ymd_opt(2002, 2, 20).unwrap();
    let mut drugs = Vec::new();
    let mut conds = Vec::new();
    for (index, timeline) in TIMELINES.iter().enumerate() {
        let person = index as u64 + 1;
        for &(concept, day) in *timeline {
            let era = EraRecord::new(person, concept, origin + TimeDelta::days(day));
            if DRUG_IDS.contains(&concept) {
                drugs.push(era);
            } else {
                conds.push(era);
            }
        }
    }
    (drugs, conds)
}
