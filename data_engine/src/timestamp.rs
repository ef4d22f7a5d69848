//! Serial-day timestamp normalization.
//!
//! Spreadsheets store instants as fractional days since 1899-12-30. This
//! module coerces the timestamp column to numbers, converts them to calendar
//! timestamps at nanosecond precision and drops every row that fails either
//! step.

use calamine::Data;
use chrono::{DateTime, NaiveDateTime};
use tracing::{info, warn};

use crate::data_engine::Sheet;
use crate::error::{DataEngineError, DataEngineResult};
use crate::timeframe::NANOS_PER_DAY;

/// Serial day number of 1970-01-01.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

/// Fractional days are rounded to this many decimals before scaling.
const FRACTION_DIGITS: i32 = 13;

/// One value of a column together with its row's timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// A sheet whose rows are keyed by their normalized timestamp.
///
/// `index[i]` belongs to `rows[i]`. Rows keep their input order; the
/// timestamp column itself is moved out of `headers` and `rows`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedSheet {
    pub headers: Vec<String>,
    pub index: Vec<NaiveDateTime>,
    pub rows: Vec<Vec<Data>>,
    /// Rows discarded because their timestamp did not convert.
    pub dropped: usize,
}

impl IndexedSheet {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Pair every timestamp with the numeric value of `column`. Cells that
    /// are not numeric become `None`.
    pub fn series(&self, column: &str) -> DataEngineResult<Vec<Observation>> {
        let col = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataEngineError::MissingColumn(column.to_string()))?;

        Ok(self
            .index
            .iter()
            .zip(&self.rows)
            .map(|(ts, row)| Observation {
                timestamp: *ts,
                value: row.get(col).and_then(coerce_numeric),
            })
            .collect())
    }
}

/// Numeric reading of a cell, `None` when there isn't one.
///
/// Text is parsed after trimming; booleans count as 1/0; date-formatted
/// cells yield their serial value.
pub fn coerce_numeric(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(v) => *v,
        Data::Int(v) => *v as f64,
        Data::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Data::DateTime(dt) => dt.as_f64(),
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!value.is_nan()).then_some(value)
}

/// Convert a serial day number to a timestamp.
///
/// Returns `None` for non-finite input and for instants that do not fit a
/// signed 64-bit nanosecond count (roughly 1677-09-21 to 2262-04-11).
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let days = serial - UNIX_EPOCH_SERIAL;
    if !days.is_finite() {
        return None;
    }
    let per_day = NANOS_PER_DAY as f64;
    if days > i64::MAX as f64 / per_day || days < i64::MIN as f64 / per_day {
        return None;
    }

    let base = days.trunc();
    let scale = 10f64.powi(FRACTION_DIGITS);
    let frac = ((days - base) * scale).round_ties_even() / scale;

    let nanos = (base as i64)
        .checked_mul(NANOS_PER_DAY)?
        .checked_add((frac * per_day) as i64)?;
    // i64::MIN is reserved as the missing-timestamp sentinel
    if nanos == i64::MIN {
        return None;
    }
    Some(DateTime::from_timestamp_nanos(nanos).naive_utc())
}

/// Replace `timestamp_column` with calendar timestamps and index the sheet
/// by them, dropping rows whose timestamp is missing or invalid.
pub fn normalize(sheet: &Sheet, timestamp_column: &str) -> DataEngineResult<IndexedSheet> {
    let ts_col = sheet.column_index(timestamp_column)?;

    let headers = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts_col)
        .map(|(_, h)| h.clone())
        .collect();

    let mut index = Vec::with_capacity(sheet.len());
    let mut rows = Vec::with_capacity(sheet.len());

    for row in &sheet.rows {
        let ts = row
            .get(ts_col)
            .and_then(coerce_numeric)
            .and_then(serial_to_datetime);
        let Some(ts) = ts else { continue };

        index.push(ts);
        rows.push(
            row.iter()
                .enumerate()
                .filter(|(i, _)| *i != ts_col)
                .map(|(_, c)| c.clone())
                .collect(),
        );
    }

    let dropped = sheet.len() - index.len();
    if index.is_empty() && !sheet.is_empty() {
        warn!(rows = sheet.len(), column = timestamp_column, "no row has a usable timestamp");
    }
    info!(kept = index.len(), dropped, "timestamps normalized");

    Ok(IndexedSheet {
        headers,
        index,
        rows,
        dropped,
    })
}
