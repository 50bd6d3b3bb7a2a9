//! Impedance Table Module
//! Flattens a dataset collection into one long-format table and derives the
//! quantities the Nyquist and Bode panels plot.

use crate::data::{DatasetCollection, MarkerStyle};
use crate::error::{PlotError, Result};
use polars::prelude::*;
use serde::Serialize;

/// Column names of the flattened table.
pub const COL_FREQ: &str = "f";
pub const COL_REAL: &str = "z_real";
pub const COL_IMAG: &str = "z_imag";
pub const COL_KIND: &str = "kind";
pub const COL_FMT: &str = "fmt";

/// Shared square Nyquist domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareRange {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl SquareRange {
    pub fn span(&self) -> f64 {
        self.max_x - self.min_x
    }
}

/// One row of the flattened table with its derived Bode quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpedanceRow {
    pub f: f64,
    pub z_real: f64,
    pub z_imag: f64,
    pub kind: String,
    pub fmt: String,
}

impl ImpedanceRow {
    pub fn neg_z_imag(&self) -> f64 {
        -self.z_imag
    }

    pub fn magnitude(&self) -> f64 {
        magnitude(self.z_real, self.z_imag)
    }

    pub fn neg_phase(&self) -> f64 {
        neg_phase(self.z_real, self.z_imag)
    }
}

/// |Z| = sqrt(re² + im²)
pub fn magnitude(z_real: f64, z_imag: f64) -> f64 {
    (z_real.powi(2) + z_imag.powi(2)).sqrt()
}

/// -atan(im / re), single-argument arctangent (no quadrant correction).
pub fn neg_phase(z_real: f64, z_imag: f64) -> f64 {
    -(z_imag / z_real).atan()
}

/// Long-format table: one row per impedance sample, columns
/// [f, z_real, z_imag, kind, fmt].
#[derive(Debug, Clone)]
pub struct ImpedanceTable {
    df: DataFrame,
}

impl ImpedanceTable {
    /// Flatten every dataset into a single table in one pass.
    pub fn from_collection(collection: &DatasetCollection) -> Result<Self> {
        let capacity = collection.sample_count();
        let mut freqs: Vec<f64> = Vec::with_capacity(capacity);
        let mut reals: Vec<f64> = Vec::with_capacity(capacity);
        let mut imags: Vec<f64> = Vec::with_capacity(capacity);
        let mut kinds: Vec<String> = Vec::with_capacity(capacity);
        let mut fmts: Vec<String> = Vec::with_capacity(capacity);

        for (label, dataset) in collection.iter() {
            if dataset.f.len() != dataset.z.len() {
                return Err(PlotError::LengthMismatch {
                    label: label.to_string(),
                    freqs: dataset.f.len(),
                    samples: dataset.z.len(),
                });
            }

            // Recognized tags are normalized so partitioning matches either spelling
            let fmt = dataset
                .style()
                .map(|s| s.tag().to_string())
                .unwrap_or_else(|| dataset.fmt.clone());

            for (f, z) in dataset.f.iter().zip(dataset.z.iter()) {
                freqs.push(*f);
                reals.push(z.re);
                imags.push(z.im);
                kinds.push(label.to_string());
                fmts.push(fmt.clone());
            }
        }

        let df = DataFrame::new(vec![
            Column::new(COL_FREQ.into(), freqs),
            Column::new(COL_REAL.into(), reals),
            Column::new(COL_IMAG.into(), imags),
            Column::new(COL_KIND.into(), kinds),
            Column::new(COL_FMT.into(), fmts),
        ])?;

        log::debug!(
            "Flattened {} datasets into {} rows",
            collection.len(),
            df.height()
        );

        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Square Nyquist domain: the span is the larger of the real range and the
    /// negated-imaginary range, anchored at each axis minimum.
    pub fn square_range(&self) -> Result<SquareRange> {
        let real = self.df.column(COL_REAL)?.f64()?;
        let imag = self.df.column(COL_IMAG)?.f64()?;

        let (Some(min_x), Some(max_x)) = (real.min(), real.max()) else {
            return Err(PlotError::EmptyCollection);
        };
        let (Some(min_imag), Some(max_imag)) = (imag.min(), imag.max()) else {
            return Err(PlotError::EmptyCollection);
        };

        // Negation swaps the extremes
        let min_y = -max_imag;
        let max_y = -min_imag;

        let range_x = max_x - min_x;
        let range_y = max_y - min_y;
        let rng = range_x.max(range_y);

        Ok(SquareRange {
            min_x,
            max_x: min_x + rng,
            min_y,
            max_y: min_y + rng,
        })
    }

    /// Distinct format tags in order of first appearance.
    pub fn formats(&self) -> Result<Vec<String>> {
        let fmt = self.df.column(COL_FMT)?.str()?;
        let mut seen: Vec<String> = Vec::new();
        for value in fmt.into_iter().flatten() {
            if !seen.iter().any(|s| s == value) {
                seen.push(value.to_string());
            }
        }
        Ok(seen)
    }

    /// Marker styles present in the table. Unrecognized tags are skipped.
    pub fn styles(&self) -> Result<Vec<MarkerStyle>> {
        let mut styles = Vec::new();
        for tag in self.formats()? {
            match MarkerStyle::from_tag(&tag) {
                Some(style) => {
                    if !styles.contains(&style) {
                        styles.push(style);
                    }
                }
                None => log::warn!("Ignoring unrecognized marker style '{}'", tag),
            }
        }
        // Lines are layered beneath points
        styles.sort_by_key(|s| match s {
            MarkerStyle::Line => 0,
            MarkerStyle::Point => 1,
        });
        Ok(styles)
    }

    /// Rows tagged with the given marker style.
    pub fn filter_by_style(&self, style: MarkerStyle) -> Result<ImpedanceTable> {
        let df = self
            .df
            .clone()
            .lazy()
            .filter(col(COL_FMT).eq(lit(style.tag())))
            .collect()?;
        Ok(Self { df })
    }

    /// Materialize the table as rows.
    pub fn rows(&self) -> Result<Vec<ImpedanceRow>> {
        let f = self.df.column(COL_FREQ)?.f64()?;
        let re = self.df.column(COL_REAL)?.f64()?;
        let im = self.df.column(COL_IMAG)?.f64()?;
        let kind = self.df.column(COL_KIND)?.str()?;
        let fmt = self.df.column(COL_FMT)?.str()?;

        let rows = f
            .into_iter()
            .zip(re.into_iter())
            .zip(im.into_iter())
            .zip(kind.into_iter())
            .zip(fmt.into_iter())
            .filter_map(|((((f, re), im), kind), fmt)| {
                Some(ImpedanceRow {
                    f: f?,
                    z_real: re?,
                    z_imag: im?,
                    kind: kind?.to_string(),
                    fmt: fmt?.to_string(),
                })
            })
            .collect();
        Ok(rows)
    }
}
