//! In-memory reference counter.
//!
//! Computes the same report the bundled script asks the database for, from
//! era records held in memory. Used to check reports and to stand in for the
//! database in tests.
//!
//! Rules:
//! - only the first era start per (person, concept) counts, and drug dates
//!   are shifted by the occurrence offset;
//! - a drug and a condition of the same person are paired when the condition
//!   starts within `[window_start, window_end]` days of the drug;
//! - "before" means the drug date is strictly earlier; equal dates count as
//!   the condition coming first;
//! - every count is a number of distinct people.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, TimeDelta};
use tscore_model::{
    CountRecord, Id, IdList, PairCounts, ParamKey, ParameterSet, Pseudocount,
};

use crate::error::ParameterError;
use crate::formula::temporal_score;

/// One drug or condition era. Only the start date matters for counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraRecord {
    pub person: u64,
    pub concept: Id,
    pub start: NaiveDate,
}

impl EraRecord {
    pub fn new(person: u64, concept: impl Into<Id>, start: NaiveDate) -> Self {
        Self {
            person,
            concept: concept.into(),
            start,
        }
    }
}

/// Window and smoothing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortWindow {
    /// Earliest condition start, in days relative to the drug date.
    pub condition_window_start: i64,
    /// Latest condition start, in days relative to the drug date.
    pub condition_window_end: i64,
    /// Days added to every first drug date.
    pub drug_occurrence_offset: i64,
    pub pseudocount: Pseudocount,
}

impl Default for CohortWindow {
    fn default() -> Self {
        Self {
            condition_window_start: -100_000,
            condition_window_end: 100_000,
            drug_occurrence_offset: 0,
            pseudocount: Pseudocount::default(),
        }
    }
}

impl CohortWindow {
    /// Read the window from a parameter set, using defaults for unset keys.
    pub fn from_parameters(params: &ParameterSet) -> Result<Self, ParameterError> {
        let defaults = Self::default();
        let pseudocount = match params.text(ParamKey::Pseudocount) {
            Some(text) => Pseudocount::parse(&text)?,
            None => defaults.pseudocount,
        };
        Ok(Self {
            condition_window_start: params
                .integer(ParamKey::ConditionWindowStart)?
                .unwrap_or(defaults.condition_window_start),
            condition_window_end: params
                .integer(ParamKey::ConditionWindowEnd)?
                .unwrap_or(defaults.condition_window_end),
            drug_occurrence_offset: params
                .integer(ParamKey::DrugOccurrenceOffset)?
                .unwrap_or(defaults.drug_occurrence_offset),
            pseudocount,
        })
    }

    fn contains(&self, drug_date: NaiveDate, cond_date: NaiveDate) -> bool {
        let days = cond_date.signed_duration_since(drug_date).num_days();
        (self.condition_window_start..=self.condition_window_end).contains(&days)
    }
}

type FirstOccurrences<'a> = BTreeMap<(u64, &'a Id), NaiveDate>;

/// Earliest start per (person, concept), for concepts in `ids`.
fn first_occurrences<'a>(
    eras: &'a [EraRecord],
    ids: &IdList,
    offset_days: i64,
) -> FirstOccurrences<'a> {
    let wanted: BTreeSet<&Id> = ids.iter().collect();
    let mut firsts = FirstOccurrences::new();
    for era in eras.iter().filter(|era| wanted.contains(&era.concept)) {
        firsts
            .entry((era.person, &era.concept))
            .and_modify(|date| *date = (*date).min(era.start))
            .or_insert(era.start);
    }
    if offset_days != 0 {
        for date in firsts.values_mut() {
            *date = shift(*date, offset_days);
        }
    }
    firsts
}

/// Add days, saturating at the calendar limits.
fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

struct JoinedRow<'a> {
    person: u64,
    drug: &'a Id,
    cond: &'a Id,
    drug_first: bool,
}

fn distinct_people<'r, 'a: 'r>(rows: impl Iterator<Item = &'r JoinedRow<'a>>) -> u64 {
    rows.map(|row| row.person).collect::<BTreeSet<_>>().len() as u64
}

fn people_with(firsts: &FirstOccurrences<'_>, concept: &Id) -> u64 {
    firsts
        .keys()
        .filter(|(_, c)| *c == concept)
        .map(|(person, _)| *person)
        .collect::<BTreeSet<_>>()
        .len() as u64
}

/// Compute one report row per (drug, condition) pair, sorted by drug then
/// condition.
///
/// Pairs without data still get a row with zero counts. Duplicate IDs produce
/// duplicate rows.
pub fn compute_counts(
    drug_eras: &[EraRecord],
    cond_eras: &[EraRecord],
    drug_ids: &IdList,
    cond_ids: &IdList,
    window: &CohortWindow,
) -> Vec<CountRecord> {
    let first_drugs = first_occurrences(drug_eras, drug_ids, window.drug_occurrence_offset);
    let first_conds = first_occurrences(cond_eras, cond_ids, 0);

    let mut joined = Vec::new();
    for (&(person, drug), &drug_date) in &first_drugs {
        for (&(cond_person, cond), &cond_date) in &first_conds {
            if person == cond_person && window.contains(drug_date, cond_date) {
                joined.push(JoinedRow {
                    person,
                    drug,
                    cond,
                    drug_first: drug_date < cond_date,
                });
            }
        }
    }

    let population = first_drugs
        .keys()
        .chain(first_conds.keys())
        .map(|(person, _)| *person)
        .collect::<BTreeSet<_>>()
        .len() as u64;

    let mut records = Vec::with_capacity(drug_ids.len() * cond_ids.len());
    for drug in drug_ids {
        for cond in cond_ids {
            let of_drug = || joined.iter().filter(|row| row.drug == drug);
            let of_cond = || joined.iter().filter(|row| row.cond == cond);
            let of_pair = || of_drug().filter(|row| row.cond == cond);

            let pair = PairCounts {
                drug_before_cond: distinct_people(of_pair().filter(|row| row.drug_first)),
                cond_before_drug: distinct_people(of_pair().filter(|row| !row.drug_first)),
                drug_and_cond: distinct_people(of_pair()),
                drug_before_any_cond: distinct_people(of_drug().filter(|row| row.drug_first)),
                drug_and_any_cond: distinct_people(of_drug()),
                any_drug_before_cond: distinct_people(of_cond().filter(|row| row.drug_first)),
                any_drug_and_cond: distinct_people(of_cond()),
            };
            records.push(CountRecord {
                drug: drug.clone(),
                cond: cond.clone(),
                drug_total: people_with(&first_drugs, drug),
                cond_total: people_with(&first_conds, cond),
                population,
                temporal_score: temporal_score(&pair, window.pseudocount),
                pair,
            });
        }
    }
    records.sort_by(|a, b| (&a.drug, &a.cond).cmp(&(&b.drug, &b.cond)));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        shift(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), n)
    }

    fn ids(values: &[u64]) -> IdList {
        values.iter().copied().map(Id::from).collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let drugs = vec![
            EraRecord::new(1, 10u64, day(50)),
            EraRecord::new(1, 10u64, day(5)),
        ];
        let conds = vec![EraRecord::new(1, 20u64, day(10))];
        let rows = compute_counts(&drugs, &conds, &ids(&[10]), &ids(&[20]), &CohortWindow::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pair.drug_before_cond, 1);
        assert_eq!(rows[0].pair.cond_before_drug, 0);
    }

    #[test]
    fn test_same_day_counts_as_condition_first() {
        let drugs = vec![EraRecord::new(1, 10u64, day(3))];
        let conds = vec![EraRecord::new(1, 20u64, day(3))];
        let rows = compute_counts(&drugs, &conds, &ids(&[10]), &ids(&[20]), &CohortWindow::default());
        assert_eq!(rows[0].pair.drug_before_cond, 0);
        assert_eq!(rows[0].pair.cond_before_drug, 1);
        assert_eq!(rows[0].pair.drug_and_cond, 1);
    }

    #[test]
    fn test_window_and_offset() {
        let drugs = vec![EraRecord::new(1, 10u64, day(0))];
        let conds = vec![EraRecord::new(1, 20u64, day(40))];
        let narrow = CohortWindow {
            condition_window_start: 0,
            condition_window_end: 30,
            ..CohortWindow::default()
        };
        let rows = compute_counts(&drugs, &conds, &ids(&[10]), &ids(&[20]), &narrow);
        assert_eq!(rows[0].pair.drug_and_cond, 0);
        // Marginals ignore the window.
        assert_eq!(rows[0].drug_total, 1);
        assert_eq!(rows[0].cond_total, 1);

        let shifted = CohortWindow {
            drug_occurrence_offset: 20,
            ..narrow
        };
        let rows = compute_counts(&drugs, &conds, &ids(&[10]), &ids(&[20]), &shifted);
        assert_eq!(rows[0].pair.drug_and_cond, 1);
    }

    #[test]
    fn test_unlisted_concepts_are_ignored() {
        let drugs = vec![
            EraRecord::new(1, 10u64, day(0)),
            EraRecord::new(2, 11u64, day(0)),
        ];
        let rows = compute_counts(&drugs, &[], &ids(&[10]), &ids(&[20]), &CohortWindow::default());
        assert_eq!(rows[0].population, 1);
    }

    #[test]
    fn test_duplicates_and_ordering() {
        let rows = compute_counts(&[], &[], &ids(&[9, 3, 9]), &ids(&[2, 1]), &CohortWindow::default());
        let keys: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.drug.to_string(), r.cond.to_string()))
            .collect();
        let expected: Vec<(String, String)> = [
            ("3", "1"),
            ("3", "2"),
            ("9", "1"),
            ("9", "1"),
            ("9", "2"),
            ("9", "2"),
        ]
        .iter()
        .map(|(d, c)| (d.to_string(), c.to_string()))
        .collect();
        assert_eq!(keys, expected);
        assert!(rows.iter().all(|r| r.temporal_score == 2.0));
    }

    #[test]
    fn test_shift_saturates() {
        assert_eq!(shift(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(shift(NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(shift(day(0), i64::MAX), NaiveDate::MAX);
    }

    #[test]
    fn test_window_from_parameters() {
        let mut params = ParameterSet::defaults();
        params.set(ParamKey::ConditionWindowStart, "-30");
        params.set(ParamKey::Pseudocount, "0.5");
        let window = CohortWindow::from_parameters(&params).unwrap();
        assert_eq!(window.condition_window_start, -30);
        assert_eq!(window.condition_window_end, 100_000);
        assert_eq!(window.pseudocount.get(), 0.5);

        params.set(ParamKey::DrugOccurrenceOffset, "soon");
        assert!(CohortWindow::from_parameters(&params).is_err());
    }
}
