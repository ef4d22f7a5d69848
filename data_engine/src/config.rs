use std::path::{Path, PathBuf};

use crate::error::DataEngineResult;
use crate::timeframe::{default_timeframes, Timeframe};

pub const INPUT_FILE: &str = "../All Contracts.xlsb";
pub const SHEET_NAME: &str = "Sheet1";
pub const OUTPUT_DIR: &str = "../data";
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const VALUE_COLUMN: &str = "Sell Premium";

/// Everything a pipeline run reads. `Default` is the stock run over
/// `../All Contracts.xlsb` into `../data/`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_file: PathBuf,
    pub sheet_name: String,
    pub output_dir: PathBuf,
    pub timestamp_column: String,
    pub value_column: String,
    pub timeframes: Vec<Timeframe>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_file: PathBuf::from(INPUT_FILE),
            sheet_name: SHEET_NAME.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            timestamp_column: TIMESTAMP_COLUMN.to_string(),
            value_column: VALUE_COLUMN.to_string(),
            timeframes: default_timeframes(),
        }
    }
}

impl PipelineConfig {
    pub fn with_input_file(mut self, path: impl AsRef<Path>) -> Self {
        self.input_file = path.as_ref().to_path_buf();
        self
    }

    pub fn with_sheet_name(mut self, sheet: impl Into<String>) -> Self {
        self.sheet_name = sheet.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    pub fn with_timeframes(mut self, timeframes: Vec<Timeframe>) -> Self {
        self.timeframes = timeframes;
        self
    }

    /// Replace the timeframe table with minute-count labels, e.g.
    /// `["5", "60", "1440"]`.
    pub fn with_timeframe_labels(self, labels: &[&str]) -> DataEngineResult<Self> {
        let timeframes = labels
            .iter()
            .map(|l| Timeframe::from_label(l))
            .collect::<DataEngineResult<Vec<_>>>()?;
        Ok(self.with_timeframes(timeframes))
    }

    /// `<output_dir>/candles_M<label>.csv`
    pub fn output_path(&self, timeframe: &Timeframe) -> PathBuf {
        self.output_dir.join(timeframe.file_name())
    }
}
