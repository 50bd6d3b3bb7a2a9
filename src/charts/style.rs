//! Series Style Module
//! Parses matplotlib-style format strings (e.g. ".-", "o", "r--") and holds
//! the per-series overrides passed through to the static renderer.

use crate::error::{PlotError, Result};
use plotters::style::RGBColor;

/// Default series colour (matplotlib's first cycle colour).
pub const DEFAULT_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Colour cycle for datasets without an explicit colour.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
];

/// Marker symbols of the matplotlib format-string grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Point,
    Pixel,
    Circle,
    TriangleDown,
    TriangleUp,
    TriangleLeft,
    TriangleRight,
    TriDown,
    TriUp,
    TriLeft,
    TriRight,
    Octagon,
    Square,
    Pentagon,
    PlusFilled,
    Star,
    Hexagon,
    HexagonFlat,
    Plus,
    Cross,
    CrossFilled,
    Diamond,
    ThinDiamond,
    VLine,
    HLine,
}

/// Pixel-space outline of a marker, relative to the data point.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Filled disc of the given radius
    Disc(i32),
    /// Filled polygon
    Polygon(Vec<(i32, i32)>),
    /// Stroked open path
    Path(Vec<(i32, i32)>),
}

impl Marker {
    fn from_char(c: char) -> Option<Self> {
        let marker = match c {
            '.' => Marker::Point,
            ',' => Marker::Pixel,
            'o' => Marker::Circle,
            'v' => Marker::TriangleDown,
            '^' => Marker::TriangleUp,
            '<' => Marker::TriangleLeft,
            '>' => Marker::TriangleRight,
            '1' => Marker::TriDown,
            '2' => Marker::TriUp,
            '3' => Marker::TriLeft,
            '4' => Marker::TriRight,
            '8' => Marker::Octagon,
            's' => Marker::Square,
            'p' => Marker::Pentagon,
            'P' => Marker::PlusFilled,
            '*' => Marker::Star,
            'h' => Marker::Hexagon,
            'H' => Marker::HexagonFlat,
            '+' => Marker::Plus,
            'x' => Marker::Cross,
            'X' => Marker::CrossFilled,
            'D' => Marker::Diamond,
            'd' => Marker::ThinDiamond,
            '|' => Marker::VLine,
            '_' => Marker::HLine,
            _ => return None,
        };
        Some(marker)
    }

    /// Marker radius in pixels when no size override is given.
    pub fn default_size(&self) -> u32 {
        match self {
            Marker::Pixel => 1,
            Marker::Point => 2,
            _ => 4,
        }
    }

    /// Outline at radius `size`. Screen y grows downward.
    pub fn glyph(&self, size: i32) -> Glyph {
        let s = size;
        match self {
            Marker::Point | Marker::Pixel | Marker::Circle => Glyph::Disc(s),
            Marker::TriangleUp => Glyph::Polygon(vec![(0, -s), (s, s), (-s, s)]),
            Marker::TriangleDown => Glyph::Polygon(vec![(0, s), (s, -s), (-s, -s)]),
            Marker::TriangleLeft => Glyph::Polygon(vec![(-s, 0), (s, -s), (s, s)]),
            Marker::TriangleRight => Glyph::Polygon(vec![(s, 0), (-s, -s), (-s, s)]),
            Marker::TriDown => Glyph::Path(spokes(size, 90.0)),
            Marker::TriUp => Glyph::Path(spokes(size, -90.0)),
            Marker::TriLeft => Glyph::Path(spokes(size, 180.0)),
            Marker::TriRight => Glyph::Path(spokes(size, 0.0)),
            Marker::Square => Glyph::Polygon(vec![(-s, -s), (s, -s), (s, s), (-s, s)]),
            Marker::Pentagon => Glyph::Polygon(regular_polygon(5, size, -90.0)),
            Marker::Hexagon => Glyph::Polygon(regular_polygon(6, size, -90.0)),
            Marker::HexagonFlat => Glyph::Polygon(regular_polygon(6, size, 0.0)),
            Marker::Octagon => Glyph::Polygon(regular_polygon(8, size, 22.5)),
            Marker::Star => Glyph::Polygon(star(size)),
            Marker::Diamond => Glyph::Polygon(vec![(0, -s), (s, 0), (0, s), (-s, 0)]),
            Marker::ThinDiamond => {
                let w = (size as f64 * 0.6).round() as i32;
                Glyph::Polygon(vec![(0, -s), (w, 0), (0, s), (-w, 0)])
            }
            Marker::PlusFilled => Glyph::Polygon(filled_plus(size, 0.0)),
            Marker::CrossFilled => Glyph::Polygon(filled_plus(size, 45.0)),
            // Strokes meet at the centre so one path draws every arm
            Marker::Plus => Glyph::Path(vec![(-s, 0), (s, 0), (0, 0), (0, -s), (0, s)]),
            Marker::Cross => Glyph::Path(vec![(-s, -s), (s, s), (0, 0), (s, -s), (-s, s)]),
            Marker::VLine => Glyph::Path(vec![(0, -s), (0, s)]),
            Marker::HLine => Glyph::Path(vec![(-s, 0), (s, 0)]),
        }
    }
}

fn polar(radius: f64, degrees: f64) -> (i32, i32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    ((radius * cos).round() as i32, (radius * sin).round() as i32)
}

fn regular_polygon(sides: usize, size: i32, start_deg: f64) -> Vec<(i32, i32)> {
    let step = 360.0 / sides as f64;
    (0..sides)
        .map(|i| polar(size as f64, start_deg + step * i as f64))
        .collect()
}

fn star(size: i32) -> Vec<(i32, i32)> {
    (0..10)
        .map(|i| {
            let radius = size as f64 * if i % 2 == 0 { 1.0 } else { 0.4 };
            polar(radius, -90.0 + 36.0 * i as f64)
        })
        .collect()
}

fn spokes(size: i32, first_deg: f64) -> Vec<(i32, i32)> {
    let mut path = Vec::with_capacity(6);
    for i in 0..3 {
        path.push((0, 0));
        path.push(polar(size as f64, first_deg + 120.0 * i as f64));
    }
    path
}

/// Twelve-corner plus with arms a third of `size` wide, rotated by `rotate_deg`.
fn filled_plus(size: i32, rotate_deg: f64) -> Vec<(i32, i32)> {
    let s = size as f64;
    let w = s / 3.0;
    // Top arm; the other three are quarter turns of it
    let arm = [(-w, -s), (w, -s), (w, -w)];
    (0..4)
        .flat_map(|quarter| {
            let (sin, cos) = (rotate_deg + 90.0 * quarter as f64).to_radians().sin_cos();
            arm.iter().map(move |(x, y)| {
                (
                    (x * cos - y * sin).round() as i32,
                    (x * sin + y * cos).round() as i32,
                )
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    /// Dash and gap length in pixels, `None` for a solid line.
    pub fn dash_pattern(&self) -> Option<(u32, u32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((8, 5)),
            LineStyle::Dotted => Some((2, 4)),
            LineStyle::DashDot => Some((8, 3)),
        }
    }
}

/// Colour from a matplotlib cycle reference such as "C1".
fn cycle_color(digit: char) -> Option<RGBColor> {
    digit
        .to_digit(10)
        .map(|d| PALETTE[d as usize % PALETTE.len()])
}

fn color_from_char(c: char) -> Option<RGBColor> {
    match c {
        'b' => Some(RGBColor(0, 0, 255)),
        'g' => Some(RGBColor(0, 128, 0)),
        'r' => Some(RGBColor(255, 0, 0)),
        'c' => Some(RGBColor(0, 191, 191)),
        'm' => Some(RGBColor(191, 0, 191)),
        'y' => Some(RGBColor(191, 191, 0)),
        'k' => Some(RGBColor(0, 0, 0)),
        'w' => Some(RGBColor(255, 255, 255)),
        _ => None,
    }
}

/// Parsed format string: optional marker, optional line style, optional colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFormat {
    pub marker: Option<Marker>,
    pub line: Option<LineStyle>,
    pub color: Option<RGBColor>,
}

impl LineFormat {
    /// Parse a format string. Components may appear in any order, each at
    /// most once. A string with neither marker nor line style draws a solid
    /// line.
    pub fn parse(fmt: &str) -> Result<Self> {
        let invalid = || PlotError::InvalidFormat(fmt.to_string());
        let mut marker = None;
        let mut line = None;
        let mut color = None;

        let chars: Vec<char> = fmt.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            let parsed_line = match (c, next) {
                ('-', Some('-')) => Some((LineStyle::Dashed, 2)),
                ('-', Some('.')) => Some((LineStyle::DashDot, 2)),
                ('-', _) => Some((LineStyle::Solid, 1)),
                (':', _) => Some((LineStyle::Dotted, 1)),
                _ => None,
            };

            if let Some((style, width)) = parsed_line {
                if line.replace(style).is_some() {
                    return Err(invalid());
                }
                i += width;
                continue;
            }

            if c == 'C' {
                let rgb = next.and_then(cycle_color).ok_or_else(invalid)?;
                if color.replace(rgb).is_some() {
                    return Err(invalid());
                }
                i += 2;
                continue;
            }

            if let Some(m) = Marker::from_char(c) {
                if marker.replace(m).is_some() {
                    return Err(invalid());
                }
            } else if let Some(rgb) = color_from_char(c) {
                if color.replace(rgb).is_some() {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
            i += 1;
        }

        if marker.is_none() && line.is_none() {
            line = Some(LineStyle::Solid);
        }

        Ok(Self {
            marker,
            line,
            color,
        })
    }
}

/// Per-series overrides forwarded to the line-drawing primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStyle {
    pub color: Option<RGBColor>,
    pub line_width: Option<u32>,
    pub marker_size: Option<u32>,
    /// Legend entry; a legend is drawn only when set
    pub label: Option<String>,
}

impl SeriesStyle {
    pub fn with_color(mut self, color: RGBColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line_width(mut self, width: u32) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn with_marker_size(mut self, size: u32) -> Self {
        self.marker_size = Some(size);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Colour from the override, then the format string, then the default.
    pub fn resolve_color(&self, format: &LineFormat) -> RGBColor {
        self.color.or(format.color).unwrap_or(DEFAULT_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_and_line() {
        let f = LineFormat::parse(".-").unwrap();
        assert_eq!(f.marker, Some(Marker::Point));
        assert_eq!(f.line, Some(LineStyle::Solid));
        assert_eq!(f.color, None);
    }

    #[test]
    fn test_parse_marker_only() {
        let f = LineFormat::parse("o").unwrap();
        assert_eq!(f.marker, Some(Marker::Circle));
        assert_eq!(f.line, None);
    }

    #[test]
    fn test_parse_color_and_dashes() {
        let f = LineFormat::parse("r--").unwrap();
        assert_eq!(f.line, Some(LineStyle::Dashed));
        assert_eq!(f.color, Some(RGBColor(255, 0, 0)));

        let f = LineFormat::parse("k-.").unwrap();
        assert_eq!(f.line, Some(LineStyle::DashDot));
        assert_eq!(f.marker, None);
    }

    #[test]
    fn test_color_only_draws_solid_line() {
        let f = LineFormat::parse("g").unwrap();
        assert_eq!(f.line, Some(LineStyle::Solid));
        assert_eq!(f.marker, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(LineFormat::parse("oo").is_err());
        assert!(LineFormat::parse("q").is_err());
        assert!(LineFormat::parse("--:").is_err());
    }

    #[test]
    fn test_parse_extended_markers() {
        let cases = [
            ("*", Marker::Star),
            ("D", Marker::Diamond),
            ("d", Marker::ThinDiamond),
            ("v", Marker::TriangleDown),
            (",", Marker::Pixel),
            ("h", Marker::Hexagon),
            ("1", Marker::TriDown),
            ("|", Marker::VLine),
        ];
        for (fmt, marker) in cases {
            let f = LineFormat::parse(fmt).unwrap();
            assert_eq!(f.marker, Some(marker), "format {:?}", fmt);
            assert_eq!(f.line, None);
        }

        let f = LineFormat::parse("gD--").unwrap();
        assert_eq!(f.marker, Some(Marker::Diamond));
        assert_eq!(f.line, Some(LineStyle::Dashed));
    }

    #[test]
    fn test_parse_cycle_colors() {
        let f = LineFormat::parse("C1").unwrap();
        assert_eq!(f.color, Some(PALETTE[1]));
        assert_eq!(f.line, Some(LineStyle::Solid));

        let f = LineFormat::parse("C3o:").unwrap();
        assert_eq!(f.color, Some(PALETTE[3]));
        assert_eq!(f.marker, Some(Marker::Circle));
        assert_eq!(f.line, Some(LineStyle::Dotted));

        assert!(LineFormat::parse("C").is_err());
        assert!(LineFormat::parse("Cq").is_err());
        assert!(LineFormat::parse("rC1").is_err());
    }

    #[test]
    fn test_glyph_outlines() {
        assert_eq!(Marker::Circle.glyph(4), Glyph::Disc(4));
        assert_eq!(
            Marker::Diamond.glyph(4),
            Glyph::Polygon(vec![(0, -4), (4, 0), (0, 4), (-4, 0)])
        );
        match Marker::Star.glyph(10) {
            Glyph::Polygon(points) => {
                assert_eq!(points.len(), 10);
                assert_eq!(points[0], (0, -10));
                assert_eq!(points[5], (0, 4));
            }
            other => panic!("unexpected glyph {:?}", other),
        }
        match Marker::Octagon.glyph(8) {
            Glyph::Polygon(points) => assert_eq!(points.len(), 8),
            other => panic!("unexpected glyph {:?}", other),
        }
        match Marker::CrossFilled.glyph(9) {
            Glyph::Polygon(points) => {
                assert_eq!(points.len(), 12);
                assert!(points.iter().all(|(x, y)| x.abs() <= 9 && y.abs() <= 9));
            }
            other => panic!("unexpected glyph {:?}", other),
        }
        match Marker::TriUp.glyph(6) {
            Glyph::Path(path) => {
                assert_eq!(path.len(), 6);
                assert_eq!(path[1], (0, -6));
            }
            other => panic!("unexpected glyph {:?}", other),
        }
    }

    #[test]
    fn test_style_color_precedence() {
        let f = LineFormat::parse("r.").unwrap();
        assert_eq!(SeriesStyle::default().resolve_color(&f), RGBColor(255, 0, 0));
        let style = SeriesStyle::default().with_color(RGBColor(1, 2, 3));
        assert_eq!(style.resolve_color(&f), RGBColor(1, 2, 3));
        let plain = LineFormat::parse("-").unwrap();
        assert_eq!(SeriesStyle::default().resolve_color(&plain), DEFAULT_COLOR);
    }
}
