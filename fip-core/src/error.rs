use thiserror::Error;

/// Errors raised when a table is built or addressed by column name.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Row {row} has {found} {kind} values, expected {expected}")]
    WidthMismatch {
        row: usize,
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate key at row {row}: ({period}, {key})")]
    DuplicateKey {
        row: usize,
        period: String,
        key: String,
    },
}
