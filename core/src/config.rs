use crate::{render::HeatmapStyle, synth::SynthConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "chart.png";

/// The complete, fixed configuration of one chart run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub synth: SynthConfig,
    pub style: HeatmapStyle,
    pub output_path: PathBuf,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            synth: SynthConfig::default(),
            style: HeatmapStyle::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl ChartConfig {
    /// Smaller population for tests; everything else as in production.
    pub fn default_test() -> Self {
        Self {
            synth: SynthConfig {
                customers: 200,
                ..SynthConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}
