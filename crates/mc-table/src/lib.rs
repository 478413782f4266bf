//! mc-table: time-series tables and the glue around them.
//!
//! - `TimeSeriesTable`: labelled columns sampled at strictly increasing times
//! - storage: `.sto` and CSV text formats, plus JSON
//! - interpolate: piecewise-linear resampling
//! - filter: zero-phase low-pass filtering

pub mod filter;
pub mod interpolate;
pub mod storage;
pub mod table;

pub use filter::filter_lowpass;
pub use interpolate::interpolate;
pub use storage::{
    from_csv_str, from_sto_str, read_csv, read_json, read_sto, to_csv_string, to_sto_string,
    write_csv, write_json, write_sto,
};
pub use table::TimeSeriesTable;

pub type TableResult<T> = Result<T, TableError>;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column not found: {label}")]
    ColumnNotFound { label: String },

    #[error("Duplicate column label: {label}")]
    DuplicateLabel { label: String },

    #[error("Shape mismatch: {what}")]
    Shape { what: String },

    #[error("Times must be strictly increasing (row {row})")]
    NonMonotonicTime { row: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error on line {line}: {what}")]
    Parse { line: usize, what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}
