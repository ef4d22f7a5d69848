pub mod candle_type;
pub mod config;
pub mod data_engine;
pub mod error;
pub mod pipeline;
pub mod resample;
pub mod timeframe;
pub mod timestamp;

pub use crate::candle_type::{Candle, CandleRow};
pub use crate::config::PipelineConfig;
pub use crate::data_engine::{write_csv, DataEngine, Sheet};
pub use crate::error::{DataEngineError, DataEngineResult};
pub use crate::pipeline::{process_sheet, run, TimeframeOutput};
pub use crate::resample::resample_ohlc;
pub use crate::timeframe::{default_timeframes, Timeframe, TimeframeUnit};
pub use crate::timestamp::{normalize, IndexedSheet, Observation};
