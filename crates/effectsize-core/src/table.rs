use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of values stored in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Values of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Label for a row, used when the column acts as a grouping factor.
    ///
    /// Numeric values use their shortest display form (`1.0` renders as `1`).
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Numeric(values) => values.get(row).map(|value| value.to_string()),
            ColumnData::Categorical(values) => values.get(row).cloned(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }
}

/// Observations of one metric for one level of a grouping column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSample {
    pub label: String,
    pub values: Vec<f64>,
}

/// Immutable table of equally sized, uniquely named columns.
///
/// Rows are observations. Operations never mutate a table; renaming
/// returns a new copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl DataTable {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(Error::InvalidTable(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        let row_count = columns.first().map(|col| col.data.len()).unwrap_or(0);
        if let Some(column) = columns.iter().find(|col| col.data.len() != row_count) {
            return Err(Error::InvalidTable(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.data.len(),
                row_count
            )));
        }

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    /// Names of numeric columns in table order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|col| col.kind() == ColumnKind::Numeric)
            .map(|col| col.name.as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|col| col.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|col| col.name == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(Error::ColumnType {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
                found: ColumnKind::Categorical,
            }),
        }
    }

    /// Per-row labels of any column.
    pub fn labels(&self, name: &str) -> Result<Vec<String>> {
        let column = self.column(name)?;
        Ok((0..self.row_count)
            .filter_map(|row| column.data.label(row))
            .collect())
    }

    /// Distinct labels of a column, ordered by first occurrence.
    pub fn levels(&self, name: &str) -> Result<Vec<String>> {
        let mut seen = BTreeSet::new();
        Ok(self
            .labels(name)?
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect())
    }

    /// Split a numeric column by the levels of a grouping column.
    ///
    /// Groups are ordered by first occurrence of their label; values keep
    /// row order within each group.
    pub fn numeric_by_level(&self, metric: &str, group: &str) -> Result<Vec<GroupSample>> {
        let values = self.numeric(metric)?;
        let labels = self.labels(group)?;

        let mut samples: Vec<GroupSample> = Vec::new();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        for (value, label) in values.iter().zip(labels) {
            let slot = match index.get(&label) {
                Some(slot) => *slot,
                None => {
                    index.insert(label.clone(), samples.len());
                    samples.push(GroupSample {
                        label,
                        values: Vec::new(),
                    });
                    samples.len() - 1
                }
            };
            samples[slot].values.push(*value);
        }

        Ok(samples)
    }

    /// Return a copy with columns renamed according to `renames`.
    ///
    /// Each `(from, to)` pair must name an existing column. Repeating the
    /// same pair is allowed. A target that lands on another column's name
    /// fails with [`Error::NameCollision`] rather than shadowing it.
    pub fn with_renamed(&self, renames: &[(&str, &str)]) -> Result<DataTable> {
        let mut mapping: BTreeMap<&str, &str> = BTreeMap::new();
        for (from, to) in renames {
            if !self.has_column(from) {
                return Err(Error::MissingColumn(from.to_string()));
            }
            if let Some(existing) = mapping.get(from).copied() {
                if existing != *to {
                    return Err(Error::InvalidTable(format!(
                        "column '{from}' renamed to both '{existing}' and '{to}'"
                    )));
                }
                continue;
            }
            mapping.insert(*from, *to);
        }

        let mut taken = BTreeSet::new();
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let name = mapping
                .get(column.name.as_str())
                .copied()
                .unwrap_or(column.name.as_str());
            if !taken.insert(name.to_string()) {
                let source = mapping
                    .iter()
                    .find(|(_, to)| **to == name)
                    .map(|(from, _)| from.to_string())
                    .unwrap_or_else(|| column.name.clone());
                return Err(Error::NameCollision {
                    column: source,
                    sanitized: name.to_string(),
                });
            }
            columns.push(Column {
                name: name.to_string(),
                data: column.data.clone(),
            });
        }

        Ok(DataTable {
            columns,
            row_count: self.row_count,
        })
    }
}
