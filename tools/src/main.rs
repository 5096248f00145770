//! chart-runner: renders the customer engagement correlation heatmap.
//!
//! Usage:
//!   chart-runner
//!
//! Takes no arguments. Writes chart.png (512x512) into the working
//! directory, replacing any previous file. Set RUST_LOG=debug for detail.

use anyhow::Result;
use engagement_core::{
    config::ChartConfig,
    pipeline::{self, RunReport},
};

fn main() -> Result<()> {
    env_logger::init();

    let config = ChartConfig::default();
    log::debug!("resolved config: {}", serde_json::to_string(&config)?);

    println!("Customer Engagement Correlation: chart-runner");
    println!("  seed:      {}", config.synth.seed);
    println!("  customers: {}", config.synth.customers);
    println!("  output:    {}", config.output_path.display());
    println!();

    let report = pipeline::run(&config)?;
    print_summary(&report);

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("=== Run summary ===");
    println!("  seed:      {}", report.seed);
    println!("  rows:      {}", report.rows);
    println!("  image:     {}x{}", report.width, report.height);
    println!("  written:   {}", report.output_path.display());
    println!();
    println!("  strongest correlations:");
    for pair in &report.strongest {
        println!("    {:>6.2}  {} / {}", pair.r, pair.a, pair.b);
    }
}
