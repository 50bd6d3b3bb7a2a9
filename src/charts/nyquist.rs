//! Static Nyquist Renderer
//! Draws -Im(Z) against Re(Z) on a plotters drawing area.
//!
//! Formatting:
//! 1. Equal aspect ratio (one data unit spans the same pixels on both axes)
//! 2. Axis labels Z′(ω) / −Z″(ω) with the caller's unit string
//! 3. Enlarged tick labels, five ticks per axis, light major grid
//! 4. Tick labels scaled by a fixed order of magnitude with a ×10ⁿ offset text

use crate::charts::formatter::FixedOrderFormatter;
use crate::charts::style::{Glyph, LineFormat, SeriesStyle, PALETTE};
use crate::config::RenderConfig;
use crate::data::{DatasetCollection, MarkerStyle};
use crate::error::{PlotError, Result};
use num_complex::Complex64;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);
const CHART_MARGIN: u32 = 10;
// Fraction of the data span added on each side
const DATA_MARGIN: f64 = 0.05;

/// Nyquist coordinates `(Re(z), -Im(z))`, order preserved.
pub fn nyquist_points(z: &[Complex64]) -> Vec<(f64, f64)> {
    z.iter().map(|z| (z.re, -z.im)).collect()
}

/// Bounds of a point set padded by `DATA_MARGIN`; degenerate spans get a unit window.
fn padded_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let span = max - min;
    if span == 0.0 {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.5 };
        return Some((min - half, max + half));
    }
    Some((min - span * DATA_MARGIN, max + span * DATA_MARGIN))
}

/// Widen whichever axis is too narrow so both axes share one data-units-per-pixel
/// ratio for a plotting area of `plot_px` pixels.
pub fn equal_aspect_ranges(
    x: (f64, f64),
    y: (f64, f64),
    plot_px: (u32, u32),
) -> (Range<f64>, Range<f64>) {
    let (w, h) = (plot_px.0.max(1) as f64, plot_px.1.max(1) as f64);
    let units_per_px = ((x.1 - x.0) / w).max((y.1 - y.0) / h);

    let widen = |(lo, hi): (f64, f64), px: f64| {
        let center = (lo + hi) / 2.0;
        let half = units_per_px * px / 2.0;
        (center - half)..(center + half)
    };

    (widen(x, w), widen(y, h))
}

/// Lower bound on the spacing of `ticks` mesh labels over `range`, with one
/// halving of headroom for the mesh's rounded steps.
pub fn tick_step(range: &Range<f64>, ticks: usize) -> f64 {
    (range.end - range.start).abs() / (ticks.max(1) * 2) as f64
}

/// One series overlaid on a Nyquist chart.
#[derive(Debug, Clone)]
pub struct NyquistSeries<'a> {
    pub z: &'a [Complex64],
    pub fmt: &'a str,
    pub style: SeriesStyle,
}

impl<'a> NyquistSeries<'a> {
    pub fn new(z: &'a [Complex64], fmt: &'a str) -> Self {
        Self {
            z,
            fmt,
            style: SeriesStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }
}

/// One labelled series per dataset, coloured from the palette in collection
/// order. Datasets with an unrecognized marker tag are skipped.
pub fn series_from_collection(collection: &DatasetCollection) -> Vec<NyquistSeries<'_>> {
    collection
        .iter()
        .enumerate()
        .filter_map(|(idx, (label, dataset))| {
            let Some(style) = dataset.style() else {
                log::warn!(
                    "Skipping dataset '{}' with unrecognized marker style '{}'",
                    label,
                    dataset.fmt
                );
                return None;
            };
            let fmt = match style {
                MarkerStyle::Line => "-",
                MarkerStyle::Point => "o",
            };
            let style = SeriesStyle::default()
                .with_color(PALETTE[idx % PALETTE.len()])
                .with_label(label);
            Some(NyquistSeries::new(&dataset.z, fmt).with_style(style))
        })
        .collect()
}

/// Axis-level settings for a Nyquist chart.
#[derive(Debug, Clone)]
pub struct NyquistPlot {
    scale: f64,
    units: String,
    config: RenderConfig,
}

impl Default for NyquistPlot {
    fn default() -> Self {
        Self {
            scale: 1.0,
            units: "Ohms".to_string(),
            config: RenderConfig::default(),
        }
    }
}

impl NyquistPlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis scale; tick labels are shown in units of `1/scale`.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn formatter(&self) -> FixedOrderFormatter {
        FixedOrderFormatter::for_scale(self.scale)
    }

    pub fn x_label(&self) -> String {
        format!("Z′(ω) [{}]", self.units)
    }

    pub fn y_label(&self) -> String {
        format!("−Z″(ω) [{}]", self.units)
    }

    /// Draw one series and return the same area for chaining.
    pub fn draw<'b, DB: DrawingBackend>(
        &self,
        area: &'b DrawingArea<DB, Shift>,
        z: &[Complex64],
        fmt: &str,
        style: &SeriesStyle,
    ) -> Result<&'b DrawingArea<DB, Shift>> {
        let series = NyquistSeries::new(z, fmt).with_style(style.clone());
        self.draw_overlay(area, std::slice::from_ref(&series))
    }

    /// Draw several series on shared axes.
    pub fn draw_overlay<'b, DB: DrawingBackend>(
        &self,
        area: &'b DrawingArea<DB, Shift>,
        series: &[NyquistSeries<'_>],
    ) -> Result<&'b DrawingArea<DB, Shift>> {
        let formats = series
            .iter()
            .map(|s| LineFormat::parse(s.fmt))
            .collect::<Result<Vec<_>>>()?;
        let points: Vec<Vec<(f64, f64)>> = series.iter().map(|s| nyquist_points(s.z)).collect();

        let x_bounds = padded_bounds(points.iter().flatten().map(|p| p.0))
            .ok_or(PlotError::EmptyCollection)?;
        let y_bounds = padded_bounds(points.iter().flatten().map(|p| p.1))
            .ok_or(PlotError::EmptyCollection)?;

        let cfg = &self.config;
        let x_label_area = cfg.axis_label_size * 2 + cfg.tick_label_size + 10;
        let y_label_area = cfg.axis_label_size * 2 + cfg.tick_label_size * 3 + 10;

        let (width, height) = area.dim_in_pixel();
        let plot_px = (
            width.saturating_sub(2 * CHART_MARGIN + y_label_area),
            height.saturating_sub(2 * CHART_MARGIN + x_label_area),
        );
        let (x_range, y_range) = equal_aspect_ranges(x_bounds, y_bounds, plot_px);
        log::debug!(
            "Nyquist ranges x={:?} y={:?} over {:?}px",
            x_range,
            y_range,
            plot_px
        );

        let mut chart = ChartBuilder::on(area)
            .margin(CHART_MARGIN)
            .x_label_area_size(x_label_area)
            .y_label_area_size(y_label_area)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let formatter = self.formatter();
        let x_step = tick_step(&x_range, cfg.tick_count);
        let y_step = tick_step(&y_range, cfg.tick_count);
        let x_formatter = formatter.with_tick_step(x_step);
        let y_formatter = formatter.with_tick_step(y_step);
        let x_label_fmt = |v: &f64| x_formatter.format(*v);
        let y_label_fmt = |v: &f64| y_formatter.format(*v);

        chart
            .configure_mesh()
            .x_labels(cfg.tick_count)
            .y_labels(cfg.tick_count)
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .x_desc(self.x_label())
            .y_desc(self.y_label())
            .axis_desc_style(("sans-serif", cfg.axis_label_size as f64))
            .label_style(("sans-serif", cfg.tick_label_size as f64))
            .bold_line_style(&GRID_COLOR.mix(cfg.grid_alpha))
            .light_line_style(&TRANSPARENT)
            .draw()?;

        let mut any_label = false;
        for ((s, format), pts) in series.iter().zip(formats.iter()).zip(points.iter()) {
            any_label |= Self::draw_series(&mut chart, pts, format, &s.style)?;
        }

        if any_label {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font(("sans-serif", cfg.tick_label_size as f64))
                .draw()?;
        }

        // Offset text at the far end of each axis
        let offset = formatter.offset_text();
        if !offset.is_empty() {
            let style = ("sans-serif", cfg.offset_text_size as f64).into_font().color(&BLACK);
            let size = cfg.offset_text_size as i32;
            chart.plotting_area().draw(
                &(EmptyElement::at((x_range.end, y_range.start))
                    + Text::new(offset.clone(), (-size * 4, -size - 4), style.clone())),
            )?;
            chart.plotting_area().draw(
                &(EmptyElement::at((x_range.start, y_range.end))
                    + Text::new(offset, (4, 4), style)),
            )?;
        }

        Ok(area)
    }

    /// Draw lines and markers for one series. Returns true when a legend entry
    /// was attached.
    fn draw_series<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        points: &[(f64, f64)],
        format: &LineFormat,
        style: &SeriesStyle,
    ) -> Result<bool> {
        let color = style.resolve_color(format);
        let line_style = color.stroke_width(style.line_width.unwrap_or(2));
        let mut labelled = false;

        if let Some(line) = format.line {
            let anno = match line.dash_pattern() {
                None => chart.draw_series(LineSeries::new(points.iter().copied(), line_style))?,
                Some((dash, gap)) => chart.draw_series(DashedLineSeries::new(
                    points.iter().copied(),
                    dash,
                    gap,
                    line_style,
                ))?,
            };
            if let Some(label) = &style.label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], line_style)
                });
                labelled = true;
            }
        }

        if let Some(marker) = format.marker {
            let size = style.marker_size.unwrap_or(marker.default_size()) as i32;
            let filled = color.filled();
            let anno = match marker.glyph(size) {
                Glyph::Disc(radius) => chart.draw_series(
                    points.iter().map(move |&p| Circle::new(p, radius, filled)),
                )?,
                Glyph::Polygon(outline) => chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + Polygon::new(outline.clone(), filled)
                }))?,
                Glyph::Path(path) => chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + PathElement::new(path.clone(), line_style)
                }))?,
            };
            if !labelled {
                if let Some(label) = &style.label {
                    anno.label(label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), size, filled));
                    labelled = true;
                }
            }
        }

        Ok(labelled)
    }
}

/// Draw `z` as a Nyquist plot on `area` and return the area.
pub fn plot_nyquist<'b, DB: DrawingBackend>(
    area: &'b DrawingArea<DB, Shift>,
    z: &[Complex64],
    scale: f64,
    units: &str,
    fmt: &str,
    style: &SeriesStyle,
) -> Result<&'b DrawingArea<DB, Shift>> {
    NyquistPlot::new()
        .scale(scale)
        .units(units)
        .draw(area, z, fmt, style)
}

/// Render series into an in-memory RGB image.
pub fn render_nyquist_image(
    plot: &NyquistPlot,
    series: &[NyquistSeries<'_>],
    size: (u32, u32),
) -> Result<image::RgbImage> {
    let (width, height) = size;
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        plot.draw_overlay(&root, series)?;
        root.present()?;
    }
    image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| PlotError::Drawing("image buffer size mismatch".to_string()))
}

/// Save a Nyquist figure; PNG or SVG is chosen by file extension.
pub fn save_nyquist(
    path: &Path,
    plot: &NyquistPlot,
    series: &[NyquistSeries<'_>],
    size: (u32, u32),
) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => {
            let img = render_nyquist_image(plot, series, size)?;
            img.save(path)?;
        }
        Some("svg") => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            plot.draw_overlay(&root, series)?;
            root.present()?;
        }
        _ => return Err(PlotError::UnsupportedOutput(path.display().to_string())),
    }

    log::info!("Nyquist chart saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use approx::assert_relative_eq;

    fn example() -> Vec<Complex64> {
        vec![
            Complex64::new(100.0, 0.0),
            Complex64::new(80.0, -20.0),
            Complex64::new(60.0, -40.0),
        ]
    }

    #[test]
    fn test_nyquist_points_negate_imaginary() {
        let pts = nyquist_points(&example());
        assert_eq!(pts, vec![(100.0, 0.0), (80.0, 20.0), (60.0, 40.0)]);
    }

    #[test]
    fn test_nyquist_points_preserve_order() {
        let z: Vec<Complex64> = (0..20)
            .map(|i| Complex64::new(i as f64, (i as f64).sin()))
            .collect();
        let pts = nyquist_points(&z);
        for (p, z) in pts.iter().zip(z.iter()) {
            assert_eq!(p.0, z.re);
            assert_eq!(p.1, -z.im);
        }
    }

    #[test]
    fn test_example_uses_zero_exponent() {
        let plot = NyquistPlot::new().scale(1.0);
        assert_eq!(plot.formatter().order_of_magnitude(), 0.0);
        assert_eq!(plot.formatter().offset_text(), "");
    }

    #[test]
    fn test_labels_carry_units() {
        let plot = NyquistPlot::new().units("kΩ");
        assert_eq!(plot.x_label(), "Z′(ω) [kΩ]");
        assert_eq!(plot.y_label(), "−Z″(ω) [kΩ]");
    }

    #[test]
    fn test_equal_aspect_ranges() {
        // Wide data on a square canvas: y is widened to match x
        let (x, y) = equal_aspect_ranges((0.0, 100.0), (0.0, 10.0), (500, 500));
        assert_relative_eq!(x.end - x.start, 100.0);
        assert_relative_eq!(y.end - y.start, 100.0);
        assert_relative_eq!((y.start + y.end) / 2.0, 5.0);

        // Square data on a wide canvas: x is widened
        let (x, y) = equal_aspect_ranges((0.0, 10.0), (0.0, 10.0), (400, 200));
        assert_relative_eq!((x.end - x.start) / 400.0, (y.end - y.start) / 200.0);
        assert_relative_eq!(y.end - y.start, 10.0);
    }

    #[test]
    fn test_tick_step_resolves_milliohm_spans() {
        let step = tick_step(&(0.0..0.001), 5);
        assert_relative_eq!(step, 1e-4);
        let fmt = NyquistPlot::new().formatter().with_tick_step(step);
        let labels: Vec<String> = [0.0, 0.0002, 0.0004]
            .iter()
            .map(|v| fmt.format(*v))
            .collect();
        assert_eq!(labels, vec!["0", "0.0002", "0.0004"]);
    }

    #[test]
    fn test_padded_bounds() {
        let (lo, hi) = padded_bounds([0.0, 10.0].into_iter()).unwrap();
        assert_relative_eq!(lo, -0.5);
        assert_relative_eq!(hi, 10.5);
        assert!(padded_bounds(std::iter::empty()).is_none());
        let (lo, hi) = padded_bounds([0.0].into_iter()).unwrap();
        assert!(lo < 0.0 && hi > 0.0);
    }

    #[test]
    fn test_series_skip_unknown_marker_tags() {
        let mut c = DatasetCollection::new();
        c.insert(
            "data",
            Dataset::new(vec![1.0; 3], example(), MarkerStyle::Point),
        );
        c.insert("odd", Dataset::with_tag(vec![1.0; 3], example(), "*"));
        c.insert("fit", Dataset::with_tag(vec![1.0; 3], example(), "line"));

        let series = series_from_collection(&c);
        let labels: Vec<Option<&str>> = series.iter().map(|s| s.style.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("data"), Some("fit")]);
        assert_eq!(series[0].fmt, "o");
        assert_eq!(series[1].fmt, "-");
        // Palette slots follow collection order, so "fit" keeps the third colour
        assert_eq!(series[1].style.color, Some(PALETTE[2]));
        for s in &series {
            assert!(LineFormat::parse(s.fmt).is_ok());
        }
    }

    #[test]
    fn test_invalid_format_is_reported() {
        let mut buffer = vec![0u8; 64 * 64 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (64, 64)).into_drawing_area();
        let result = plot_nyquist(&root, &example(), 1.0, "Ohms", "qq", &SeriesStyle::default());
        assert!(matches!(result, Err(PlotError::InvalidFormat(_))));
    }

    #[test]
    fn test_empty_input_is_reported() {
        let mut buffer = vec![0u8; 64 * 64 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (64, 64)).into_drawing_area();
        let result = plot_nyquist(&root, &[], 1.0, "Ohms", ".-", &SeriesStyle::default());
        assert!(matches!(result, Err(PlotError::EmptyCollection)));
    }

    #[test]
    #[ignore = "requires system fonts"]
    fn test_render_svg_contains_labels() {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (600, 600)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let style = SeriesStyle::default().with_label("cell A");
            plot_nyquist(&root, &example(), 1e-3, "Ohms", ".-", &style).unwrap();
            root.present().unwrap();
        }
        assert!(svg.contains("Z′(ω) [Ohms]"));
        assert!(svg.contains("×10³"));
        assert!(svg.contains("cell A"));
    }
}
