//! The chart pipeline.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Synthesize the metric table
//!   2. Compute the correlation matrix
//!   3. Render the heatmap
//!   4. Write the PNG
//!
//! RULES:
//!   - Each stage consumes only the previous stage's output.
//!   - All randomness flows through the RngBank inside stage 1.
//!   - Any failure aborts the run; there are no retries.

use crate::{
    config::ChartConfig,
    correlation::{CorrelationMatrix, CorrelationPair},
    error::ChartResult,
    render::HeatmapRenderer,
    synth, writer,
};
use std::path::PathBuf;

/// Pairs listed in the run summary.
pub const SUMMARY_PAIRS: usize = 3;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub seed: u64,
    pub output_path: PathBuf,
    pub rows: usize,
    pub width: u32,
    pub height: u32,
    pub strongest: Vec<CorrelationPair>,
}

pub fn run(config: &ChartConfig) -> ChartResult<RunReport> {
    log::info!(
        "synthesizing {} customers (seed {})",
        config.synth.customers,
        config.synth.seed
    );
    let table = synth::generate(&config.synth)?;

    let matrix = CorrelationMatrix::from_table(&table)?;
    log::info!("correlated {} metrics", matrix.size());

    let renderer = HeatmapRenderer::new(config.style.clone())?;
    let figure = renderer.render(&matrix)?;

    writer::write_png(&figure, &config.output_path)?;

    Ok(RunReport {
        seed: table.seed(),
        output_path: config.output_path.clone(),
        rows: table.rows(),
        width: figure.width(),
        height: figure.height(),
        strongest: matrix.strongest_pairs(SUMMARY_PAIRS),
    })
}
