//! Interactive Chart Renderer
//! Builds the combined Nyquist/Bode figure as a Vega-Lite description.
//!
//! Layout: [ Bode |Z| over Bode -phase ] | [ Nyquist ]
//! Point layers share a nearest-point selection keyed on frequency, so hovering
//! one sample enlarges the same frequency in all three panels.

use crate::charts::vega::{
    Calculate, ColorChannel, ConcatItem, ConditionalSize, Encoding, InlineData, LayerSpec, Legend,
    MarkType, Param, PositionChannel, Scale, Selection, SizeCondition, TopLevelSpec, UnitSpec,
    VConcatSpec, SCHEMA,
};
use crate::config::RenderConfig;
use crate::data::{
    DatasetCollection, ImpedanceRow, ImpedanceTable, MarkerStyle, SquareRange, COL_FREQ, COL_KIND,
    COL_REAL,
};
use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Name of the shared hover selection.
pub const HOVER_PARAM: &str = "nearest";

const NEG_IMAG_EXPR: &str = "-datum.z_imag";
const MAG_EXPR: &str = "sqrt(pow(datum.z_real,2) + pow(datum.z_imag,2))";
const NEG_PHASE_EXPR: &str = "-atan(datum.z_imag/datum.z_real)";

pub const NYQUIST_X_TITLE: &str = "Z' [Ω]";
pub const NYQUIST_Y_TITLE: &str = "-Z'' [Ω]";
pub const FREQ_TITLE: &str = "f [Hz]";
pub const MAG_TITLE: &str = "|Z| [Ω]";
// Values are radians despite the degree title
pub const PHASE_TITLE: &str = "-ϕ [°]";

/// Which of the three panels a unit view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Nyquist,
    BodeMagnitude,
    BodePhase,
}

impl Panel {
    fn view_name(&self, style: MarkerStyle) -> String {
        let panel = match self {
            Panel::Nyquist => "nyquist",
            Panel::BodeMagnitude => "bode_mag",
            Panel::BodePhase => "bode_phase",
        };
        let kind = match style {
            MarkerStyle::Line => "line",
            MarkerStyle::Point => "point",
        };
        format!("{}_{}", panel, kind)
    }
}

/// Rows drawn with one marker style.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayer {
    pub style: MarkerStyle,
    pub rows: Vec<ImpedanceRow>,
}

impl ChartLayer {
    /// Distinct dataset labels in order of first appearance.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !kinds.contains(&row.kind.as_str()) {
                kinds.push(&row.kind);
            }
        }
        kinds
    }

    /// Rows of a single dataset.
    pub fn rows_for<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ImpedanceRow> + 'a {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

/// Composed Nyquist/Bode figure, owned by the caller for display or export.
#[derive(Debug, Clone)]
pub struct InteractiveChart {
    size: u32,
    range: SquareRange,
    layers: Vec<ChartLayer>,
    config: RenderConfig,
}

impl InteractiveChart {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Shared square Nyquist domain.
    pub fn range(&self) -> SquareRange {
        self.range
    }

    /// Layers in drawing order (lines beneath points).
    pub fn layers(&self) -> &[ChartLayer] {
        &self.layers
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// True when any point layer carries the hover selection and pan/zoom.
    pub fn has_hover_selection(&self) -> bool {
        self.layers.iter().any(|l| l.style == MarkerStyle::Point)
    }

    /// Typed Vega-Lite specification.
    pub fn spec(&self) -> Result<TopLevelSpec> {
        let mut nyquists = Vec::new();
        let mut mags = Vec::new();
        let mut phases = Vec::new();
        let mut params = Vec::new();
        let mut hover_views = Vec::new();

        for layer in &self.layers {
            let values = layer
                .rows
                .iter()
                .map(serde_json::to_value)
                .collect::<serde_json::Result<Vec<Value>>>()?;

            nyquists.push(self.nyquist_unit(layer.style, &values));
            mags.push(self.bode_unit(layer.style, &values, Panel::BodeMagnitude));
            phases.push(self.bode_unit(layer.style, &values, Panel::BodePhase));

            if layer.style == MarkerStyle::Point {
                for panel in [Panel::Nyquist, Panel::BodeMagnitude, Panel::BodePhase] {
                    let view = panel.view_name(layer.style);
                    params.push(Param {
                        name: format!("{}_zoom", view),
                        select: Selection::Interval,
                        bind: Some("scales"),
                        views: vec![view.clone()],
                    });
                    hover_views.push(view);
                }
            }
        }

        if !hover_views.is_empty() {
            params.insert(
                0,
                Param {
                    name: HOVER_PARAM.to_string(),
                    select: Selection::Point {
                        on: "mouseover".to_string(),
                        nearest: true,
                        fields: vec![COL_FREQ.to_string()],
                    },
                    bind: None,
                    views: hover_views,
                },
            );
        }

        let bode = ConcatItem::VConcat(VConcatSpec {
            vconcat: vec![LayerSpec { layer: mags }, LayerSpec { layer: phases }],
        });
        let nyquist = ConcatItem::Layer(LayerSpec { layer: nyquists });

        Ok(TopLevelSpec {
            schema: SCHEMA,
            hconcat: vec![bode, nyquist],
            params,
        })
    }

    /// Vega-Lite JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.spec()?)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.spec()?)?)
    }

    /// Write the chart description to a `.json` file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        log::info!("Interactive chart saved to {}", path.display());
        Ok(())
    }

    fn hover_size(&self) -> ConditionalSize {
        ConditionalSize {
            condition: SizeCondition {
                param: HOVER_PARAM.to_string(),
                empty: false,
                value: self.config.selected_point_size,
            },
            value: self.config.point_size,
        }
    }

    fn mark(style: MarkerStyle) -> MarkType {
        match style {
            MarkerStyle::Line => MarkType::Line,
            MarkerStyle::Point => MarkType::Circle,
        }
    }

    fn nyquist_unit(&self, style: MarkerStyle, values: &[Value]) -> UnitSpec {
        let padding = Some(self.config.scale_padding);
        let x = PositionChannel::quantitative(COL_REAL, NYQUIST_X_TITLE).with_scale(Scale {
            domain: Some([self.range.min_x, self.range.max_x]),
            padding,
            ..Scale::default()
        });
        let y = PositionChannel::quantitative("neg_z_imag", NYQUIST_Y_TITLE).with_scale(Scale {
            domain: Some([self.range.min_y, self.range.max_y]),
            padding,
            ..Scale::default()
        });

        let mut color = ColorChannel::nominal(COL_KIND);
        let mut size = None;
        let mut name = None;
        if style == MarkerStyle::Point {
            color.legend = Some(Legend {
                title: "Legend".to_string(),
            });
            size = Some(self.hover_size());
            name = Some(Panel::Nyquist.view_name(style));
        }

        UnitSpec {
            name,
            data: InlineData {
                values: values.to_vec(),
            },
            mark: Self::mark(style),
            transform: vec![Calculate::new(NEG_IMAG_EXPR, "neg_z_imag")],
            encoding: Encoding {
                x,
                y: Some(y),
                color,
                size,
            },
            width: self.size as f64,
            height: self.size as f64,
        }
    }

    fn bode_unit(&self, style: MarkerStyle, values: &[Value], panel: Panel) -> UnitSpec {
        let x = PositionChannel::quantitative(COL_FREQ, FREQ_TITLE).with_scale(Scale {
            scale_type: Some("log".to_string()),
            ..Scale::default()
        });
        let y = match panel {
            Panel::BodePhase => PositionChannel::quantitative("neg_phase", PHASE_TITLE),
            _ => PositionChannel::quantitative("mag", MAG_TITLE),
        };

        let (size, name) = match style {
            MarkerStyle::Point => (Some(self.hover_size()), Some(panel.view_name(style))),
            MarkerStyle::Line => (None, None),
        };

        UnitSpec {
            name,
            data: InlineData {
                values: values.to_vec(),
            },
            mark: Self::mark(style),
            transform: vec![
                Calculate::new(MAG_EXPR, "mag"),
                Calculate::new(NEG_PHASE_EXPR, "neg_phase"),
            ],
            encoding: Encoding {
                x,
                y: Some(y),
                color: ColorChannel::nominal(COL_KIND),
                size,
            },
            width: self.size as f64,
            height: self.config.bode_height(self.size),
        }
    }
}

/// Build the combined Nyquist/Bode chart for a collection of datasets.
///
/// `size` is the Nyquist panel edge in pixels; each Bode panel is `size` wide
/// and `size / 2 - 25` tall.
pub fn plot_interactive(collection: &DatasetCollection, size: u32) -> Result<InteractiveChart> {
    plot_interactive_with(collection, size, &RenderConfig::default())
}

pub fn plot_interactive_with(
    collection: &DatasetCollection,
    size: u32,
    config: &RenderConfig,
) -> Result<InteractiveChart> {
    let table = ImpedanceTable::from_collection(collection)?;
    let range = table.square_range()?;

    let mut layers = Vec::new();
    for style in table.styles()? {
        let rows = table.filter_by_style(style)?.rows()?;
        layers.push(ChartLayer { style, rows });
    }

    log::debug!(
        "Interactive chart: {} rows, {} layers, square span {}",
        table.height(),
        layers.len(),
        range.span()
    );

    Ok(InteractiveChart {
        size,
        range,
        layers,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn dataset(style: MarkerStyle) -> Dataset {
        Dataset::new(
            vec![1000.0, 100.0, 10.0],
            vec![
                Complex64::new(100.0, 0.0),
                Complex64::new(80.0, -20.0),
                Complex64::new(60.0, -40.0),
            ],
            style,
        )
    }

    fn collection(styles: &[(&str, MarkerStyle)]) -> DatasetCollection {
        styles
            .iter()
            .map(|(label, style)| (*label, dataset(*style)))
            .collect()
    }

    #[test]
    fn test_line_only_has_no_selection() {
        let chart = plot_interactive(&collection(&[("fit", MarkerStyle::Line)]), 400).unwrap();
        assert!(!chart.has_hover_selection());
        let value = chart.to_value().unwrap();
        assert!(value.get("params").is_none());
        assert_eq!(value["hconcat"][1]["layer"][0]["mark"], "line");
        assert!(value["hconcat"][1]["layer"][0]["encoding"]
            .get("size")
            .is_none());
    }

    #[test]
    fn test_point_only_has_hover_and_zoom() {
        let chart = plot_interactive(&collection(&[("data", MarkerStyle::Point)]), 400).unwrap();
        assert!(chart.has_hover_selection());
        let value = chart.to_value().unwrap();

        let params = value["params"].as_array().unwrap();
        assert_eq!(params[0]["name"], HOVER_PARAM);
        assert_eq!(params[0]["select"]["on"], "mouseover");
        assert_eq!(params[0]["select"]["fields"][0], "f");
        assert_eq!(params[0]["views"].as_array().unwrap().len(), 3);
        let zooms = params.iter().filter(|p| p["bind"] == "scales").count();
        assert_eq!(zooms, 3);

        let nyquist = &value["hconcat"][1]["layer"][0];
        assert_eq!(nyquist["mark"], "circle");
        assert_eq!(nyquist["encoding"]["size"]["condition"]["value"], 80);
        assert_eq!(nyquist["encoding"]["size"]["value"], 30);
        assert_eq!(nyquist["encoding"]["color"]["legend"]["title"], "Legend");
    }

    #[test]
    fn test_layout_bode_stack_then_nyquist() {
        let chart = plot_interactive(
            &collection(&[("data", MarkerStyle::Point), ("fit", MarkerStyle::Line)]),
            300,
        )
        .unwrap();
        let value = chart.to_value().unwrap();
        let bode = &value["hconcat"][0]["vconcat"];
        assert_eq!(bode[0]["layer"].as_array().unwrap().len(), 2);
        assert_eq!(bode[0]["layer"][0]["encoding"]["y"]["field"], "mag");
        assert_eq!(bode[1]["layer"][0]["encoding"]["y"]["field"], "neg_phase");
        let phase_axis = &bode[1]["layer"][0]["encoding"]["y"]["axis"];
        assert_eq!(phase_axis["title"], "-ϕ [°]");
        assert_eq!(bode[0]["layer"][0]["height"], 125.0);
        assert_eq!(bode[0]["layer"][0]["encoding"]["x"]["scale"]["type"], "log");
        // Lines layer beneath points
        assert_eq!(value["hconcat"][1]["layer"][0]["mark"], "line");
        assert_eq!(value["hconcat"][1]["layer"][1]["mark"], "circle");
        assert_eq!(value["hconcat"][1]["layer"][1]["width"], 300.0);
    }

    #[test]
    fn test_nyquist_domain_is_square() {
        let chart = plot_interactive(&collection(&[("data", MarkerStyle::Point)]), 400).unwrap();
        let value = chart.to_value().unwrap();
        let enc = &value["hconcat"][1]["layer"][0]["encoding"];
        let x = enc["x"]["scale"]["domain"].as_array().unwrap();
        let y = enc["y"]["scale"]["domain"].as_array().unwrap();
        let span_x = x[1].as_f64().unwrap() - x[0].as_f64().unwrap();
        let span_y = y[1].as_f64().unwrap() - y[0].as_f64().unwrap();
        assert_relative_eq!(span_x, span_y);
        assert_relative_eq!(span_x, 40.0);
        assert_eq!(enc["x"]["scale"]["nice"], false);
        assert_eq!(enc["x"]["scale"]["padding"], 5);
    }

    #[test]
    fn test_unknown_tags_are_dropped() {
        let mut c = collection(&[("data", MarkerStyle::Point)]);
        c.insert(
            "odd",
            Dataset::with_tag(vec![1.0], vec![Complex64::new(500.0, -500.0)], "*"),
        );
        let chart = plot_interactive(&c, 400).unwrap();
        assert_eq!(chart.layers().len(), 1);
        assert!(chart.layers()[0].rows.iter().all(|r| r.kind == "data"));
        // Dropped rows still count toward the shared range
        assert_relative_eq!(chart.range().max_x, 560.0);
    }

    #[test]
    fn test_rows_carry_raw_values() {
        let chart = plot_interactive(&collection(&[("data", MarkerStyle::Point)]), 400).unwrap();
        let value = chart.to_value().unwrap();
        let row = &value["hconcat"][1]["layer"][0]["data"]["values"][1];
        assert_eq!(row["f"], 100.0);
        assert_eq!(row["z_real"], 80.0);
        assert_eq!(row["z_imag"], -20.0);
        assert_eq!(row["kind"], "data");
        let layer = &chart.layers()[0];
        assert_relative_eq!(layer.rows[1].magnitude(), 82.46211251235321, epsilon = 1e-9);
        assert_eq!(layer.kinds(), vec!["data"]);
    }

    #[test]
    fn test_chart_description_keeps_every_row() {
        let c = collection(&[("data", MarkerStyle::Point), ("fit", MarkerStyle::Line)]);
        let spec = plot_interactive(&c, 400).unwrap().spec().unwrap();
        let value = serde_json::to_value(&spec).unwrap();
        for layer in value["hconcat"][1]["layer"].as_array().unwrap() {
            assert_eq!(layer["data"]["values"].as_array().unwrap().len(), 3);
        }
    }

    #[test]
    fn test_empty_collection_fails() {
        assert!(plot_interactive(&DatasetCollection::new(), 400).is_err());
    }
}
