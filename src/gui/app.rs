//! EIS Plot Main Application
//! Main window with control panel and the interactive Nyquist/Bode viewer.

use crate::charts::{save_nyquist, InteractiveChart, NyquistPlot, NyquistSeries, SeriesStyle};
use crate::data::MarkerStyle;
use crate::error::Result;
use crate::gui::chart_viewer::kind_color;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use num_complex::Complex64;
use plotters::style::RGBColor;
use std::path::Path;

/// Main application window.
pub struct ImpedanceApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl ImpedanceApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, chart: InteractiveChart) -> Self {
        let mut chart_viewer = ChartViewer::new();
        chart_viewer.set_chart(chart);
        Self {
            control_panel: ControlPanel::new(),
            chart_viewer,
        }
    }

    /// Handle Vega-Lite export
    fn handle_export_vega(&mut self) {
        let Some(chart) = self.chart_viewer.chart() else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Vega-Lite JSON", &["json"])
            .set_file_name("impedance.vl.json")
            .save_file()
        else {
            return;
        };

        match chart.save(&path) {
            Ok(()) => self.finish_export(&path),
            Err(e) => {
                log::error!("Vega-Lite export failed: {}", e);
                self.control_panel.set_status(&format!("Export error: {}", e));
            }
        }
    }

    /// Handle static Nyquist export
    fn handle_export_nyquist(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .add_filter("SVG Image", &["svg"])
            .set_file_name("nyquist.png")
            .save_file()
        else {
            return;
        };

        match self.export_nyquist(&path) {
            Ok(()) => self.finish_export(&path),
            Err(e) => {
                log::error!("Nyquist export failed: {}", e);
                self.control_panel.set_status(&format!("Export error: {}", e));
            }
        }
    }

    /// Render every dataset of the current chart onto one static Nyquist figure.
    fn export_nyquist(&self, path: &Path) -> Result<()> {
        let Some(chart) = self.chart_viewer.chart() else {
            return Ok(());
        };

        let kinds = self.chart_viewer.kinds();
        let mut owned: Vec<(Vec<Complex64>, &'static str, SeriesStyle)> = Vec::new();
        for layer in chart.layers() {
            let fmt = match layer.style {
                MarkerStyle::Line => "-",
                MarkerStyle::Point => "o",
            };
            for kind in layer.kinds() {
                let z: Vec<Complex64> = layer
                    .rows_for(kind)
                    .map(|row| Complex64::new(row.z_real, row.z_imag))
                    .collect();
                let idx = kinds.iter().position(|k| k == kind).unwrap_or(0);
                let c = kind_color(idx);
                let style = SeriesStyle::default()
                    .with_color(RGBColor(c.r(), c.g(), c.b()))
                    .with_label(kind);
                owned.push((z, fmt, style));
            }
        }

        let series: Vec<NyquistSeries<'_>> = owned
            .iter()
            .map(|(z, fmt, style)| NyquistSeries::new(z, fmt).with_style(style.clone()))
            .collect();

        let config = chart.config();
        let settings = &self.control_panel.settings;
        let plot = NyquistPlot::new()
            .scale(settings.scale)
            .units(settings.units.clone())
            .config(config.clone());

        save_nyquist(
            path,
            &plot,
            &series,
            (config.image_width, config.image_height),
        )
    }

    fn finish_export(&mut self, path: &Path) {
        self.control_panel
            .set_status(&format!("Saved {}", path.display()));
        if let Err(e) = open::that(path) {
            log::warn!("Could not open {}: {}", path.display(), e);
        }
    }
}

impl eframe::App for ImpedanceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(
                        ui,
                        self.chart_viewer.kinds(),
                        self.chart_viewer.hovered_frequency(),
                    );

                    match action {
                        ControlPanelAction::ExportVegaLite => self.handle_export_vega(),
                        ControlPanelAction::ExportNyquist => self.handle_export_nyquist(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.chart_viewer.show(ui);
            });
        });
    }
}

/// Open the native viewer window for a chart.
pub fn run_viewer(chart: InteractiveChart) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("EIS Plot"),
        ..Default::default()
    };

    eframe::run_native(
        "EIS Plot",
        options,
        Box::new(move |cc| Ok(Box::new(ImpedanceApp::new(cc, chart)))),
    )
}
