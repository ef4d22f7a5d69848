use data_engine::{pipeline, PipelineConfig};
use tracing::{info, Level};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is reserved for the per-timeframe report lines
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig::default();
    let outputs = pipeline::run(&config)?;

    let bars: usize = outputs.iter().map(|o| o.bars).sum();
    info!(files = outputs.len(), bars, "done");

    Ok(())
}
