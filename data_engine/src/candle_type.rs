use chrono::NaiveDateTime;
use serde::Serialize;

use crate::data_engine::{serialize_float, CsvRecord, IndexFormat};

/// One OHLC bar of a resampled series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// A candle as it appears in the output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRow {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(serialize_with = "serialize_float")]
    pub open: f64,
    #[serde(serialize_with = "serialize_float")]
    pub high: f64,
    #[serde(serialize_with = "serialize_float")]
    pub low: f64,
    #[serde(serialize_with = "serialize_float")]
    pub close: f64,
}

impl Candle {
    /// A bar opened by its first value.
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Candle {
            time,
            open: value,
            high: value,
            low: value,
            close: value,
        }
    }

    /// Fold the next value in time order into the bar.
    pub fn update(&mut self, value: f64) {
        if value > self.high {
            self.high = value;
        }
        if value < self.low {
            self.low = value;
        }
        self.close = value;
    }
}

impl CsvRecord for Candle {
    type Row = CandleRow;

    fn headers() -> &'static [&'static str] {
        &["Time", "open", "high", "low", "close"]
    }

    fn index(&self) -> NaiveDateTime {
        self.time
    }

    fn to_row(&self, index_format: IndexFormat) -> CandleRow {
        CandleRow {
            time: index_format.format(self.time),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}
