use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDateTime, NaiveTime};
use csv::{Terminator, WriterBuilder};
use serde::{Serialize, Serializer};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{DataEngineError, DataEngineResult};

pub trait CsvRecord: std::fmt::Debug {
    /// What actually goes through the CSV serializer, one per record.
    type Row: Serialize;

    fn headers() -> &'static [&'static str];
    /// Row label written in the first column.
    fn index(&self) -> NaiveDateTime;
    fn to_row(&self, index_format: IndexFormat) -> Self::Row;
}

/// How the row-label column is rendered. Decided once per file: a file whose
/// labels are all at midnight gets plain dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Date,
    DateTime,
}

impl IndexFormat {
    pub fn for_index<I: IntoIterator<Item = NaiveDateTime>>(index: I) -> Self {
        if index.into_iter().all(|ts| ts.time() == NaiveTime::MIN) {
            IndexFormat::Date
        } else {
            IndexFormat::DateTime
        }
    }

    pub fn format(&self, ts: NaiveDateTime) -> String {
        match self {
            IndexFormat::Date => ts.format("%Y-%m-%d").to_string(),
            IndexFormat::DateTime => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One worksheet: the header row plus every following row, cells untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Sheet { headers, rows }
    }

    /// First row becomes the header, the rest are data rows.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(|c| c.to_string()).collect(),
            None => Vec::new(),
        };
        let rows = rows.map(|r| r.to_vec()).collect();
        Sheet { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> DataEngineResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataEngineError::MissingColumn(name.to_string()))
    }
}

pub struct DataEngine;

impl Default for DataEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DataEngine {
    pub fn new() -> Self {
        DataEngine
    }

    /// Read `sheet_name` from the workbook at `path`. The format (xlsb, xlsx,
    /// xls, ods) is picked from the file extension.
    pub fn fetch_sheet(&self, path: &Path, sheet_name: &str) -> DataEngineResult<Sheet> {
        let mut workbook = open_workbook_auto(path)?;

        let available = workbook.sheet_names();
        if !available.iter().any(|s| s == sheet_name) {
            return Err(DataEngineError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available,
            });
        }

        let range = workbook.worksheet_range(sheet_name)?;
        let sheet = Sheet::from_range(&range);
        info!(
            path = %path.display(),
            sheet = sheet_name,
            rows = sheet.len(),
            columns = sheet.headers.len(),
            "loaded worksheet"
        );
        Ok(sheet)
    }
}

/// Write `records` to `file_path`, replacing any existing file.
pub fn write_csv<T: CsvRecord>(records: &[T], file_path: &Path) -> DataEngineResult<()> {
    // header is written by hand so that an empty file still gets one
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_path(file_path)?;

    writer.write_record(T::headers())?;

    let index_format = IndexFormat::for_index(records.iter().map(|r| r.index()));
    for record in records {
        writer.serialize(record.to_row(index_format))?;
    }
    writer.flush()?;

    debug!(path = %file_path.display(), rows = records.len(), "csv written");
    Ok(())
}

/// Shortest round-trip rendering that always shows it is a float:
/// `10.0`, `0.25`, `1e-05`, `1.5e+16`.
pub fn format_float(value: f64) -> String {
    let s = format!("{value:?}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// `serialize_with` helper writing a float through [`format_float`].
pub fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_float(*value))
}
