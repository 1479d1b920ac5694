//! Parsing reports back into rows.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;
use tscore_model::{CountRecord, Id, PairCounts, REPORT_COLUMNS};

use crate::error::{ReportError, Result};

/// Parse a headerless report.
///
/// Fields may be padded with spaces, as SQL*Plus pads columns. Blank lines
/// and lines with only empty fields are skipped.
pub fn read_report<R: Read>(reader: R) -> Result<Vec<CountRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(parse_record(&record)?);
    }
    debug!(rows = records.len(), "Parsed report");
    Ok(records)
}

fn parse_record(record: &StringRecord) -> Result<CountRecord> {
    let line = record.position().map_or(0, csv::Position::line);
    if record.len() != REPORT_COLUMNS.len() {
        return Err(ReportError::ColumnCount {
            line,
            expected: REPORT_COLUMNS.len(),
            found: record.len(),
        });
    }
    let field = |index: usize| record.get(index).unwrap_or_default();
    let invalid = |index: usize| ReportError::InvalidField {
        line,
        column: REPORT_COLUMNS[index],
        value: field(index).to_string(),
    };

    let id = |index: usize| parse_id(field(index)).ok_or_else(|| invalid(index));
    let count = |index: usize| field(index).parse::<u64>().map_err(|_| invalid(index));

    let mut pair = [0u64; 7];
    for (offset, slot) in pair.iter_mut().enumerate() {
        *slot = count(2 + offset)?;
    }
    let temporal_score = field(12)
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| invalid(12))?;

    Ok(CountRecord {
        drug: id(0)?,
        cond: id(1)?,
        pair: PairCounts::from_columns(pair),
        drug_total: count(9)?,
        cond_total: count(10)?,
        population: count(11)?,
        temporal_score,
    })
}

/// All-digit fields are numeric IDs; any other non-empty field is a token.
fn parse_id(field: &str) -> Option<Id> {
    if field.is_empty() {
        return None;
    }
    if field.bytes().all(|b| b.is_ascii_digit())
        && let Ok(value) = field.parse()
    {
        return Some(Id::Int(value));
    }
    Some(Id::Token(field.to_string()))
}
