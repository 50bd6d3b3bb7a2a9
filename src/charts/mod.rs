//! Charts module - Nyquist and Bode rendering

mod formatter;
mod interactive;
mod nyquist;
mod style;
pub mod vega;

pub use formatter::{decimals_for_step, fixed_order_of_magnitude, FixedOrderFormatter};
pub use interactive::{
    plot_interactive, plot_interactive_with, ChartLayer, InteractiveChart, Panel, FREQ_TITLE,
    HOVER_PARAM, MAG_TITLE, NYQUIST_X_TITLE, NYQUIST_Y_TITLE, PHASE_TITLE,
};
pub use nyquist::{
    equal_aspect_ranges, nyquist_points, plot_nyquist, render_nyquist_image, save_nyquist,
    series_from_collection, tick_step, NyquistPlot, NyquistSeries,
};
pub use style::{Glyph, LineFormat, LineStyle, Marker, SeriesStyle, DEFAULT_COLOR, PALETTE};
