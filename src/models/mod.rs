//! Domain models for the leakmerge consolidation pipeline.
//!
//! This module contains the tabular data structures used throughout the
//! pipeline:
//!
//! - [`Cell`] - a tagged cell value (`Text | Number | Missing`)
//! - [`Row`] - one record, keyed by trimmed column name
//! - [`RecordSet`] - the parsed contents of one machine export
//! - [`Table`] - the consolidated union of all record sets
//!
//! The machine exports have no fixed schema: columns are discovered at load
//! time and merged with union semantics, so every structure here carries an
//! explicit ordered column list next to its rows.

use chrono::NaiveDateTime;
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

// =============================================================================
// Cell
// =============================================================================

/// One cell of a machine export.
///
/// `Missing` is an explicit "no value" state, distinct from zero and from
/// the empty string. Empty source cells, failed numeric coercions and
/// columns absent from a given file all land here.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Raw text as decoded from the file.
    Text(String),
    /// Numeric value after coercion or derivation.
    Number(f64),
    /// No value.
    Missing,
}

impl Cell {
    /// Build a cell from one raw CSV field. Empty fields become `Missing`.
    pub fn from_raw(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the cell, if it holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Serialized as the natural JSON value: string, number or null.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Missing => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Row
// =============================================================================

/// One record: trimmed column name to cell value.
///
/// Columns a file never had are simply absent from the map; [`row_cell`]
/// reads them back as `Missing`.
pub type Row = HashMap<String, Cell>;

/// Read one cell from a row, treating absent columns as `Missing`.
pub fn row_cell<'a>(row: &'a Row, column: &str) -> &'a Cell {
    row.get(column).unwrap_or(&Cell::Missing)
}

// =============================================================================
// RecordSet
// =============================================================================

/// The parsed contents of one input file.
///
/// `sort_keys` is the ephemeral per-row timestamp used only for ordering.
/// It lives outside the row maps so it can never leak into the exported
/// spreadsheet. The loader initializes it to all-`None`; the timestamp
/// parser fills it in.
#[derive(Debug, Clone)]
pub struct RecordSet {
    /// Source file identifier, kept for diagnostics.
    pub file: String,
    /// Column names in first-seen order.
    pub columns: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<Row>,
    /// Ephemeral sort key per row, parallel to `rows`.
    pub sort_keys: Vec<Option<NaiveDateTime>>,
}

impl RecordSet {
    pub fn new(file: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        let sort_keys = vec![None; rows.len()];
        Self {
            file: file.into(),
            columns,
            rows,
            sort_keys,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

// =============================================================================
// Table
// =============================================================================

/// The consolidated table: all record sets appended in file-arrival order.
///
/// Columns are the union across inputs in first-seen order. The table is
/// mutated in place by the sorter and the derivation engine, and lives only
/// for the duration of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Union of source columns plus derived output columns, ordered.
    pub columns: Vec<String>,
    /// All rows, file order until sorted.
    pub rows: Vec<Row>,
    /// Concatenated ephemeral sort keys; emptied by the sorter.
    pub sort_keys: Vec<Option<NaiveDateTime>>,
    /// Whether any input carried the source date column. When false the
    /// sorter passes the table through untouched.
    pub has_timestamp_source: bool,
}

impl Table {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a column in the output order.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Read one cell by row index and column name (`Missing` when absent).
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        row_cell(&self.rows[row], column)
    }

    /// Append a derived column, writing one cell per existing row.
    ///
    /// The column must not already exist; derivations only ever add new
    /// output columns.
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        debug_assert!(!self.has_column(name));
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
        self.columns.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_raw() {
        assert_eq!(Cell::from_raw("  abc "), Cell::Text("abc".into()));
        assert_eq!(Cell::from_raw(""), Cell::Missing);
        assert_eq!(Cell::from_raw("   "), Cell::Missing);
    }

    #[test]
    fn test_missing_is_not_zero_or_empty_text() {
        assert_ne!(Cell::Missing, Cell::Number(0.0));
        assert_ne!(Cell::Missing, Cell::Text(String::new()));
    }

    #[test]
    fn test_row_cell_absent_column() {
        let mut row = Row::new();
        row.insert("A".into(), Cell::Number(1.0));
        assert_eq!(row_cell(&row, "A"), &Cell::Number(1.0));
        assert_eq!(row_cell(&row, "B"), &Cell::Missing);
    }

    #[test]
    fn test_cell_serializes_to_natural_json() {
        let json = serde_json::to_string(&vec![
            Cell::Text("x".into()),
            Cell::Number(2.5),
            Cell::Missing,
        ])
        .unwrap();
        assert_eq!(json, r#"["x",2.5,null]"#);
    }

    #[test]
    fn test_push_column() {
        let mut table = Table {
            columns: vec!["A".into()],
            rows: vec![Row::from([("A".into(), Cell::Number(1.0))])],
            sort_keys: vec![],
            has_timestamp_source: false,
        };
        table.push_column("B", vec![Cell::Text("y".into())]);
        assert_eq!(table.columns, vec!["A", "B"]);
        assert_eq!(table.cell(0, "B"), &Cell::Text("y".into()));
    }
}
