//! Customer engagement correlation chart.
//!
//! Seeded synthetic metrics, reduced to a Pearson correlation matrix,
//! rendered as an annotated heatmap and written as a fixed-size PNG.

pub mod colormap;
pub mod config;
pub mod correlation;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod rng;
pub mod synth;
pub mod writer;
