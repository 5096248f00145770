use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Layout error: {width}x{height} canvas cannot fit the grid ({reason})")]
    Layout {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Population must contain at least one customer")]
    EmptyPopulation,

    #[error("Correlation needs at least 2 rows, got {rows}")]
    InsufficientRows { rows: usize },

    #[error("Column '{name}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{name}' has zero variance; correlation is undefined")]
    DegenerateColumn { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ChartResult<T> = Result<T, ChartError>;
