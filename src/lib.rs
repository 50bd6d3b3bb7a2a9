//! EIS Plot - Nyquist & Bode charts for impedance spectroscopy data
//!
//! Two independent renderers:
//! - [`charts::plot_nyquist`] draws a static Nyquist figure on a plotters drawing area
//! - [`charts::plot_interactive`] builds a combined Nyquist/Bode chart with
//!   frequency-linked hover highlighting, exported as Vega-Lite or shown in
//!   the native viewer ([`gui::run_viewer`])

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;

pub use charts::{
    plot_interactive, plot_nyquist, FixedOrderFormatter, InteractiveChart, LineFormat,
    NyquistPlot, NyquistSeries, SeriesStyle,
};
pub use config::RenderConfig;
pub use data::{Dataset, DatasetCollection, MarkerStyle};
pub use error::{PlotError, Result};
