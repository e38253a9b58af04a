use thiserror::Error;

use crate::table::ColumnKind;

/// Core error type shared across effectsize crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A column referenced by name does not exist in the table.
    #[error("missing column: {0}")]
    MissingColumn(String),
    /// A column exists but holds the wrong kind of values.
    #[error("column '{column}' is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: ColumnKind,
        found: ColumnKind,
    },
    /// The table violates internal invariants.
    #[error("invalid table: {0}")]
    InvalidTable(String),
    /// Two columns map to the same name after sanitization.
    #[error("column '{column}' sanitizes to '{sanitized}', which is already taken")]
    NameCollision { column: String, sanitized: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by effectsize crates.
pub type Result<T> = std::result::Result<T, Error>;
