//! Writing reports.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};
use tscore_model::CountRecord;

use crate::error::Result;

/// Write rows as a headerless, unquoted report.
///
/// With `precision`, scores are printed with that many decimals; without it,
/// in the shortest form that reads back to the same value.
pub fn write_report<W: Write>(
    records: &[CountRecord],
    writer: W,
    precision: Option<usize>,
) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    for record in records {
        let mut row = Vec::with_capacity(13);
        row.push(record.drug.to_string());
        row.push(record.cond.to_string());
        row.extend(record.count_columns().iter().map(u64::to_string));
        row.push(match precision {
            Some(digits) => format!("{:.digits$}", record.temporal_score),
            None => record.temporal_score.to_string(),
        });
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
