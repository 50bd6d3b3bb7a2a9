//! Chart Viewer Widget
//! Draws the Bode stack and the Nyquist panel with egui_plot.
//! Hovering a point series selects the nearest frequency, which is then
//! highlighted in all three panels.

use crate::charts::{
    ChartLayer, InteractiveChart, Panel, FREQ_TITLE, MAG_TITLE, NYQUIST_X_TITLE,
    NYQUIST_Y_TITLE, PALETTE, PHASE_TITLE,
};
use crate::data::{ImpedanceRow, MarkerStyle};
use egui::{Color32, RichText};
use egui_plot::{log_grid_spacer, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Points};

/// Hover pick radius in screen pixels
const PICK_RADIUS: f32 = 20.0;
const PANEL_SPACING: f32 = 10.0;

/// Plot coordinates of a row in the given panel. Bode panels use log10(f).
pub fn panel_coordinates(panel: Panel, row: &ImpedanceRow) -> [f64; 2] {
    match panel {
        Panel::Nyquist => [row.z_real, row.neg_z_imag()],
        Panel::BodeMagnitude => [row.f.log10(), row.magnitude()],
        Panel::BodePhase => [row.f.log10(), row.neg_phase()],
    }
}

/// Frequency of the row closest to `target`, measured with `distance`, if any
/// row lies within `max_distance`.
pub fn nearest_frequency<'a, D>(
    rows: impl Iterator<Item = &'a ImpedanceRow>,
    max_distance: f32,
    distance: D,
) -> Option<f64>
where
    D: Fn(&ImpedanceRow) -> f32,
{
    rows.map(|row| (row.f, distance(row)))
        .filter(|(_, d)| d.is_finite() && *d <= max_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(f, _)| f)
}

/// Radius of a circle mark whose area is `area` square pixels.
pub fn radius_for_area(area: u32) -> f32 {
    (area as f32 / std::f32::consts::PI).sqrt()
}

/// Format a log10 frequency tick as Hz.
pub fn format_log_frequency(log_f: f64) -> String {
    let f = 10f64.powf(log_f);
    if f >= 1e3 || f < 1e-1 {
        format!("{:.0e}", f)
    } else {
        let formatted = format!("{:.1}", f);
        formatted.trim_end_matches(".0").to_string()
    }
}

/// Get color for a dataset.
pub fn kind_color(kind_index: usize) -> Color32 {
    let c = PALETTE[kind_index % PALETTE.len()];
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Interactive Nyquist/Bode display for one chart.
pub struct ChartViewer {
    chart: Option<InteractiveChart>,
    /// Dataset labels in legend order, used for stable colours
    kinds: Vec<String>,
    hovered_freq: Option<f64>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            chart: None,
            kinds: Vec::new(),
            hovered_freq: None,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chart(&mut self, chart: InteractiveChart) {
        let mut kinds: Vec<String> = Vec::new();
        for layer in chart.layers() {
            for kind in layer.kinds() {
                if !kinds.iter().any(|k| k == kind) {
                    kinds.push(kind.to_string());
                }
            }
        }
        self.kinds = kinds;
        self.hovered_freq = None;
        self.chart = Some(chart);
    }

    pub fn chart(&self) -> Option<&InteractiveChart> {
        self.chart.as_ref()
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn hovered_frequency(&self) -> Option<f64> {
        self.hovered_freq
    }

    fn color_of(&self, kind: &str) -> Color32 {
        let idx = self.kinds.iter().position(|k| k == kind).unwrap_or(0);
        kind_color(idx)
    }

    /// Draw the three panels side by side: Bode stack | Nyquist.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(chart) = self.chart.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let size = chart.size() as f32;
        let bode_height = chart.config().bode_height(chart.size()) as f32;
        let interactive = chart.has_hover_selection();

        let mut hovered = None;
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                hovered = hovered.or(self.draw_panel(
                    ui,
                    chart,
                    Panel::BodeMagnitude,
                    size,
                    bode_height,
                    interactive,
                ));
                ui.add_space(PANEL_SPACING);
                hovered = hovered.or(self.draw_panel(
                    ui,
                    chart,
                    Panel::BodePhase,
                    size,
                    bode_height,
                    interactive,
                ));
            });
            ui.add_space(PANEL_SPACING);
            hovered = hovered.or(self.draw_panel(
                ui,
                chart,
                Panel::Nyquist,
                size,
                size,
                interactive,
            ));
        });

        // Nothing selected while the pointer is away from every point
        self.hovered_freq = hovered;
    }

    /// Draw one panel and return the frequency under the pointer.
    fn draw_panel(
        &self,
        ui: &mut egui::Ui,
        chart: &InteractiveChart,
        panel: Panel,
        width: f32,
        height: f32,
        interactive: bool,
    ) -> Option<f64> {
        let (x_label, y_label) = match panel {
            Panel::Nyquist => (NYQUIST_X_TITLE, NYQUIST_Y_TITLE),
            Panel::BodeMagnitude => (FREQ_TITLE, MAG_TITLE),
            Panel::BodePhase => (FREQ_TITLE, PHASE_TITLE),
        };

        let id = match panel {
            Panel::Nyquist => "nyquist",
            Panel::BodeMagnitude => "bode_mag",
            Panel::BodePhase => "bode_phase",
        };

        let mut plot = Plot::new(id)
            .width(width)
            .height(height)
            .allow_zoom(interactive)
            .allow_drag(interactive)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label);

        plot = match panel {
            Panel::Nyquist => {
                let range = chart.range();
                plot.data_aspect(1.0)
                    .include_x(range.min_x)
                    .include_x(range.max_x)
                    .include_y(range.min_y)
                    .include_y(range.max_y)
                    .legend(Legend::default())
            }
            _ => plot
                .x_grid_spacer(log_grid_spacer(10))
                .x_axis_formatter(|mark, _range| format_log_frequency(mark.value)),
        };

        let config = chart.config();
        let base_radius = radius_for_area(config.point_size);
        let hover_radius = radius_for_area(config.selected_point_size);

        plot.show(ui, |plot_ui| {
            for layer in chart.layers() {
                self.draw_layer(plot_ui, layer, panel, base_radius, hover_radius);
            }
            Self::pick(plot_ui, chart, panel)
        })
        .inner
    }

    fn draw_layer(
        &self,
        plot_ui: &mut PlotUi,
        layer: &ChartLayer,
        panel: Panel,
        base_radius: f32,
        hover_radius: f32,
    ) {
        for kind in layer.kinds() {
            let color = self.color_of(kind);
            let points: Vec<[f64; 2]> = layer
                .rows_for(kind)
                .map(|row| panel_coordinates(panel, row))
                .collect();

            match layer.style {
                MarkerStyle::Line => {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.into_iter()))
                            .color(color)
                            .width(2.0)
                            .name(kind),
                    );
                }
                MarkerStyle::Point => {
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.into_iter()))
                            .radius(base_radius)
                            .color(color)
                            .name(kind),
                    );

                    if let Some(freq) = self.hovered_freq {
                        let selected: Vec<[f64; 2]> = layer
                            .rows_for(kind)
                            .filter(|row| row.f == freq)
                            .map(|row| panel_coordinates(panel, row))
                            .collect();
                        if !selected.is_empty() {
                            plot_ui.points(
                                Points::new(PlotPoints::from_iter(selected.into_iter()))
                                    .radius(hover_radius)
                                    .color(color),
                            );
                        }
                    }
                }
            }
        }
    }

    /// Nearest point-layer frequency to the pointer, in screen distance.
    fn pick(plot_ui: &PlotUi, chart: &InteractiveChart, panel: Panel) -> Option<f64> {
        let pointer = plot_ui.pointer_coordinate()?;
        let pointer_screen = plot_ui.screen_from_plot(pointer);

        let rows = chart
            .layers()
            .iter()
            .filter(|l| l.style == MarkerStyle::Point)
            .flat_map(|l| l.rows.iter());

        nearest_frequency(rows, PICK_RADIUS, |row| {
            let [x, y] = panel_coordinates(panel, row);
            plot_ui
                .screen_from_plot(PlotPoint::new(x, y))
                .distance(pointer_screen)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(f: f64, re: f64, im: f64) -> ImpedanceRow {
        ImpedanceRow {
            f,
            z_real: re,
            z_imag: im,
            kind: "data".to_string(),
            fmt: "o".to_string(),
        }
    }

    #[test]
    fn test_panel_coordinates() {
        let r = row(100.0, 80.0, -20.0);
        assert_eq!(panel_coordinates(Panel::Nyquist, &r), [80.0, 20.0]);
        let [x, y] = panel_coordinates(Panel::BodeMagnitude, &r);
        assert_relative_eq!(x, 2.0);
        assert_relative_eq!(y, 82.46211251235321, epsilon = 1e-9);
        let [_, phase] = panel_coordinates(Panel::BodePhase, &r);
        assert_relative_eq!(phase, (0.25f64).atan());
    }

    #[test]
    fn test_nearest_frequency() {
        let rows = vec![row(1.0, 0.0, 0.0), row(10.0, 5.0, 0.0), row(100.0, 9.0, 0.0)];
        let pick = |target: f32| {
            nearest_frequency(rows.iter(), 2.0, |r| (r.z_real as f32 - target).abs())
        };
        assert_eq!(pick(4.5), Some(10.0));
        assert_eq!(pick(8.0), Some(100.0));
        assert_eq!(pick(2.5), None);
    }

    #[test]
    fn test_radius_for_area() {
        assert_relative_eq!(radius_for_area(80), (80.0 / std::f32::consts::PI).sqrt());
        assert!(radius_for_area(80) > radius_for_area(30));
    }

    #[test]
    fn test_format_log_frequency() {
        assert_eq!(format_log_frequency(0.0), "1");
        assert_eq!(format_log_frequency(2.0), "100");
        assert_eq!(format_log_frequency(4.0), "1e4");
        assert_eq!(format_log_frequency(-2.0), "1e-2");
    }
}
