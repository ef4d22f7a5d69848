//! Load → normalize → resample → write, once per timeframe.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::config::PipelineConfig;
use crate::data_engine::{write_csv, DataEngine, Sheet};
use crate::error::DataEngineResult;
use crate::resample::resample_ohlc;
use crate::timestamp::normalize;

/// What was written for one timeframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeOutput {
    pub label: String,
    pub path: PathBuf,
    pub file_name: String,
    pub bars: usize,
}

impl TimeframeOutput {
    /// The console summary for this file, e.g. `→ 3 bars saved to candles_M1.csv`.
    pub fn report_line(&self) -> String {
        format!("→ {} bars saved to {}", self.bars, self.file_name)
    }
}

/// Run the whole pipeline from the workbook named in `config`.
///
/// The first failure aborts the run; files written before it stay on disk.
pub fn run(config: &PipelineConfig) -> DataEngineResult<Vec<TimeframeOutput>> {
    let engine = DataEngine::new();
    let sheet = engine.fetch_sheet(&config.input_file, &config.sheet_name)?;
    process_sheet(&sheet, config)
}

/// Same as [`run`] for a sheet that is already in memory.
pub fn process_sheet(sheet: &Sheet, config: &PipelineConfig) -> DataEngineResult<Vec<TimeframeOutput>> {
    let indexed = normalize(sheet, &config.timestamp_column)?;
    let series = indexed.series(&config.value_column)?;

    fs::create_dir_all(&config.output_dir)?;

    let mut outputs = Vec::with_capacity(config.timeframes.len());
    for timeframe in &config.timeframes {
        let candles = resample_ohlc(&series, timeframe)?;
        let path = config.output_path(timeframe);

        write_csv(&candles, &path)?;

        let output = TimeframeOutput {
            label: timeframe.label().to_string(),
            path,
            file_name: timeframe.file_name(),
            bars: candles.len(),
        };
        println!("{}", output.report_line());
        outputs.push(output);
    }

    info!(
        timeframes = outputs.len(),
        output_dir = %config.output_dir.display(),
        "candle files written"
    );
    Ok(outputs)
}
