//! Core contracts and helpers for effectsize.
//!
//! This crate defines the in-memory data table, CSV loading, and the
//! formula-name helpers shared by the statistics crate and the CLI.

pub mod error;
pub mod load;
pub mod naming;
pub mod table;

pub use error::{Error, Result};
pub use load::{read_csv, read_csv_from_reader};
pub use naming::{FORMULA_RESERVED, is_formula_safe, sanitize_formula_name};
pub use table::{Column, ColumnData, ColumnKind, DataTable, GroupSample};
