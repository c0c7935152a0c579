//! CSV boundary: a minimal named-column table.
//!
//! Cells stay as strings at this boundary; parsing into numbers happens in
//! the transform, which is where type errors carry row/column context.

use std::path::Path;

use tracing::debug;

use crate::error::SchemaError;
use crate::TARGET_COLUMN;

/// A loaded tabular dataset: header names plus row-major string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a CSV file into a table.
    pub fn from_csv_path(path: &Path) -> Result<Table, SchemaError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| SchemaError::Io(format!("open '{}': {e}", path.display())))?;
        Self::from_reader(&mut reader)
    }

    /// Load CSV text into a table (useful for tests without touching the
    /// filesystem).
    pub fn from_csv_str(src: &str) -> Result<Table, SchemaError> {
        let mut reader = csv::Reader::from_reader(src.as_bytes());
        Self::from_reader(&mut reader)
    }

    fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Table, SchemaError> {
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| SchemaError::Csv(format!("header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| SchemaError::Csv(format!("row {}: {e}", i + 1)))?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        debug!(rows = rows.len(), cols = columns.len(), "loaded csv table");
        Ok(Table { columns, rows })
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Split `table` into features and labels on [`TARGET_COLUMN`].
///
/// Returns [`SchemaError::MissingTarget`] when the column is absent and
/// [`SchemaError::BadCell`] when a label is not an integer.
pub fn split_target(mut table: Table) -> Result<(Table, Vec<i64>), SchemaError> {
    let idx = table
        .column_index(TARGET_COLUMN)
        .ok_or_else(|| SchemaError::MissingTarget {
            column: TARGET_COLUMN.to_string(),
        })?;

    table.columns.remove(idx);

    let mut labels = Vec::with_capacity(table.rows.len());
    for (row_num, row) in table.rows.iter_mut().enumerate() {
        let raw = row.remove(idx);
        let label: i64 = raw.parse().map_err(|_| SchemaError::BadCell {
            row: row_num + 1,
            column: TARGET_COLUMN.to_string(),
            raw: raw.clone(),
        })?;
        labels.push(label);
    }

    Ok((table, labels))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
