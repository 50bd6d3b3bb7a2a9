//! GUI module - native interactive viewer

mod app;
mod chart_viewer;
mod control_panel;

pub use app::{run_viewer, ImpedanceApp};
pub use chart_viewer::{
    format_log_frequency, kind_color, nearest_frequency, panel_coordinates, radius_for_area,
    ChartViewer,
};
pub use control_panel::{ControlPanel, ControlPanelAction, ExportSettings};
