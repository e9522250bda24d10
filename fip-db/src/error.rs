use fip_core::period::ParsePeriodError;
use fip_core::TableError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failures. Any of these aborts the load: the catalog is never
/// built from partial data.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed {dataset} file: {source}")]
    Csv {
        dataset: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Missing column '{column}' in {dataset}")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("{dataset} line {line}: {source}")]
    InvalidPeriod {
        dataset: &'static str,
        line: u64,
        #[source]
        source: ParsePeriodError,
    },

    #[error("{dataset} line {line}: invalid {column} value '{value}'")]
    InvalidMeasure {
        dataset: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] serde_json::Error),

    #[error("Invalid boundaries: {0}")]
    Boundaries(String),

    #[error("Duplicate boundary for region '{0}'")]
    DuplicateRegion(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("No periods found in {0}")]
    NoPeriods(&'static str),
}
