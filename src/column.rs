//! Column extraction: one CSV stream in, one `Vec<f64>` out.

use std::io::Read;

use crate::error::{StatsError, StatsResult};

/// Parse one column of a CSV stream into a sequence of `f64` values.
///
/// `index` is zero-based; [`crate::pipeline::run`] converts the public
/// 1-based column before calling. The first record is treated as a header and
/// discarded.
///
/// Rules:
///
/// - A row with fewer fields than `index + 1` fails with
///   [`StatsError::ColumnOutOfRange`], reporting the field count observed.
/// - A field that does not parse as `f64` (after trimming surrounding
///   whitespace) fails with [`StatsError::NotANumber`].
/// - Any read failure other than clean end-of-input surfaces as
///   [`StatsError::Read`].
///
/// A stream with only a header (or nothing at all) yields an empty vector,
/// not an error. The reader is consumed but not closed; dropping it is the
/// caller's responsibility.
pub fn column_values<R: Read>(reader: R, index: usize) -> StatsResult<Vec<f64>> {
    // Flexible mode lets ragged rows through to the field-count check below
    // instead of failing inside the codec.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row numbers for users; +1 again because the header
        // is row 1.
        let row = row_idx0 + 2;
        let record = result?;

        let Some(raw) = record.get(index) else {
            return Err(StatsError::ColumnOutOfRange {
                column: index + 1,
                fields: record.len(),
            });
        };

        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|source| StatsError::NotANumber {
                row,
                raw: raw.to_owned(),
                source,
            })?;
        values.push(value);
    }

    Ok(values)
}
