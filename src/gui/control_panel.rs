//! Control Panel Widget
//! Left side panel with dataset legend, static-figure settings and export actions.

use crate::gui::chart_viewer::kind_color;
use egui::{Color32, RichText};

/// Settings for the static Nyquist export
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
    pub scale: f64,
    pub units: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            units: "Ohms".to_string(),
        }
    }
}

/// Action returned from control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ExportVegaLite,
    ExportNyquist,
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: ExportSettings,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: ExportSettings::default(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        kinds: &[String],
        hovered_freq: Option<f64>,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("EIS Plot")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Datasets =====
        ui.label(RichText::new("Datasets").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if kinds.is_empty() {
                    ui.label(RichText::new("No datasets").color(Color32::GRAY));
                }
                for (idx, kind) in kinds.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, kind_color(idx));
                        ui.label(RichText::new(kind).size(13.0));
                    });
                }
            });

        ui.add_space(8.0);
        let hover_text = match hovered_freq {
            Some(f) => format!("Selected: {} Hz", f),
            None => "Hover a point to select a frequency".to_string(),
        };
        ui.label(RichText::new(hover_text).size(12.0).color(Color32::GRAY));

        ui.add_space(10.0);
        ui.separator();

        // ===== Static Nyquist =====
        ui.label(RichText::new("Static Nyquist").size(14.0).strong());
        ui.add_space(5.0);

        egui::Grid::new("export_settings")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Scale");
                ui.add(
                    egui::DragValue::new(&mut self.settings.scale)
                        .speed(0.1)
                        .range(1e-12..=1e12),
                );
                ui.end_row();

                ui.label("Units");
                ui.text_edit_singleline(&mut self.settings.units);
                ui.end_row();
            });

        ui.add_space(10.0);
        ui.separator();

        // ===== Export =====
        ui.label(RichText::new("Export").size(14.0).strong());
        ui.add_space(5.0);

        let enabled = !kinds.is_empty();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(enabled, egui::Button::new("Vega-Lite JSON"))
                .clicked()
            {
                action = ControlPanelAction::ExportVegaLite;
            }
            if ui
                .add_enabled(enabled, egui::Button::new("Nyquist PNG"))
                .clicked()
            {
                action = ControlPanelAction::ExportNyquist;
            }
        });

        ui.add_space(10.0);
        ui.label(RichText::new(&self.status).size(12.0));

        action
    }
}
