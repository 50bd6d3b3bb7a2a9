//! Error types shared by the renderers.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Dataset '{label}' has {freqs} frequencies but {samples} impedance samples")]
    LengthMismatch {
        label: String,
        freqs: usize,
        samples: usize,
    },
    #[error("No impedance samples to plot")]
    EmptyCollection,
    #[error("Invalid format string '{0}'")]
    InvalidFormat(String),
    #[error("Unsupported output file '{0}'")]
    UnsupportedOutput(String),
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Drawing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
