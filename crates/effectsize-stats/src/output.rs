use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::errors::Result;

/// Write result rows as CSV, headers taken from the rows' field labels.
///
/// Returns the number of data rows written. Not-applicable cells are left
/// empty.
pub fn write_rows_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(BufWriter::new(File::create(path)?));

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
