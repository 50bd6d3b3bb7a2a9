//! Data module - impedance datasets and the flattened table

mod dataset;
mod table;

pub use dataset::{Dataset, DatasetCollection, MarkerStyle};
pub use table::{
    magnitude, neg_phase, ImpedanceRow, ImpedanceTable, SquareRange, COL_FMT, COL_FREQ, COL_IMAG,
    COL_KIND, COL_REAL,
};
