use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::table::{Column, DataTable};

/// Load a CSV file with a header row into a [`DataTable`].
///
/// A column is numeric when every cell parses as `f64` after trimming;
/// otherwise it is kept as categorical labels. Empty cells are not
/// imputed, so a numeric column with a blank cell loads as categorical.
pub fn read_csv(path: &Path) -> Result<DataTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let table = collect_table(reader)?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "table loaded"
    );
    Ok(table)
}

/// Load CSV content from any reader.
pub fn read_csv_from_reader<R: Read>(input: R) -> Result<DataTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);
    collect_table(reader)
}

fn collect_table<R: Read>(mut reader: csv::Reader<R>) -> Result<DataTable> {
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, value) in record.iter().enumerate() {
            if let Some(column) = cells.get_mut(idx) {
                column.push(value.trim().to_string());
            }
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    DataTable::new(columns)
}

fn infer_column(name: String, values: Vec<String>) -> Column {
    let parsed = values
        .iter()
        .map(|value| value.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>();

    match parsed {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::categorical(name, values),
    }
}
