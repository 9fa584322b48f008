//! Column normalization: name trimming and best-effort numeric coercion.
//!
//! The bench pads some header names with trailing spaces depending on the
//! firmware revision, so every column name is trimmed before it is used as
//! a lookup key anywhere downstream. Designated measurement columns are
//! then coerced to numbers cell by cell; a value that does not parse
//! degrades silently to `Missing`. There is no error path in this module.

use std::collections::HashMap;

use super::NUMERIC_COLUMNS;
use crate::models::{Cell, RecordSet, Row};

/// Normalize one record set in place: trim column names, then coerce the
/// designated numeric columns.
pub fn normalize(rs: &mut RecordSet) {
    trim_column_names(rs);

    for column in NUMERIC_COLUMNS {
        if !rs.has_column(column) {
            continue;
        }
        for row in &mut rs.rows {
            if let Some(cell) = row.get_mut(column) {
                *cell = coerce_numeric(cell);
            }
        }
    }
}

/// Strip surrounding whitespace from every column name, re-keying rows to
/// match. Names that collide after trimming are merged (the later column
/// wins), so the untrimmed form never coexists with the trimmed one.
pub fn trim_column_names(rs: &mut RecordSet) {
    let mut trimmed: Vec<String> = Vec::with_capacity(rs.columns.len());
    for name in &rs.columns {
        let clean = name.trim().to_string();
        if !trimmed.contains(&clean) {
            trimmed.push(clean);
        }
    }

    if trimmed == rs.columns {
        return;
    }

    for row in &mut rs.rows {
        let mut rekeyed: Row = HashMap::with_capacity(row.len());
        for name in &rs.columns {
            if let Some(cell) = row.remove(name) {
                rekeyed.insert(name.trim().to_string(), cell);
            }
        }
        *row = rekeyed;
    }
    rs.columns = trimmed;
}

/// `parse_or_missing`: numeric view of one cell, never failing.
///
/// Accepts the machine's decimal-comma notation (`1,5E-03`) alongside
/// standard floats. Anything unparsable becomes `Missing`.
pub fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(n) => Cell::Number(*n),
        Cell::Missing => Cell::Missing,
        Cell::Text(text) => match parse_number(text) {
            Some(n) => Cell::Number(n),
            None => Cell::Missing,
        },
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }
    // Decimal comma, but only when it cannot be a thousands separator.
    if trimmed.contains(',') && !trimmed.contains('.') {
        return trimmed.replace(',', ".").parse::<f64>().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    fn record_set(columns: &[&str], rows: Vec<Vec<Cell>>) -> RecordSet {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .cloned()
                    .zip(cells)
                    .collect::<Row>()
            })
            .collect();
        RecordSet::new("test.csv", columns, rows)
    }

    #[test]
    fn test_column_names_trimmed_and_rekeyed() {
        let mut rs = record_set(
            &[" ESTADO ", "FECHA Y HORA"],
            vec![vec![Cell::Text("1".into()), Cell::Text("x".into())]],
        );
        normalize(&mut rs);

        assert_eq!(rs.columns, vec!["ESTADO", "FECHA Y HORA"]);
        assert_eq!(rs.rows[0]["ESTADO"], Cell::Number(1.0));
        assert!(!rs.rows[0].contains_key(" ESTADO "));
    }

    #[test]
    fn test_designated_columns_coerced() {
        let mut rs = record_set(
            &["VALOR_FUGA", "OPERADOR"],
            vec![vec![Cell::Text("2.5e-3".into()), Cell::Text("ana".into())]],
        );
        normalize(&mut rs);

        assert_eq!(rs.rows[0]["VALOR_FUGA"], Cell::Number(2.5e-3));
        // Non-designated columns keep their text.
        assert_eq!(rs.rows[0]["OPERADOR"], Cell::Text("ana".into()));
    }

    #[test]
    fn test_non_numeric_degrades_to_missing() {
        let mut rs = record_set(
            &["EXPONENCIAL"],
            vec![vec![Cell::Text("ERR".into())], vec![Cell::Text("-3".into())]],
        );
        normalize(&mut rs);

        assert_eq!(rs.rows[0]["EXPONENCIAL"], Cell::Missing);
        assert_eq!(rs.rows[1]["EXPONENCIAL"], Cell::Number(-3.0));
    }

    #[test]
    fn test_decimal_comma_accepted() {
        assert_eq!(
            coerce_numeric(&Cell::Text("1,5".into())),
            Cell::Number(1.5)
        );
        assert_eq!(
            coerce_numeric(&Cell::Text("1,5E-03".into())),
            Cell::Number(1.5e-3)
        );
        // Mixed separators stay ambiguous and degrade.
        assert_eq!(coerce_numeric(&Cell::Text("1,234.5".into())), Cell::Missing);
    }

    #[test]
    fn test_missing_stays_missing() {
        assert_eq!(coerce_numeric(&Cell::Missing), Cell::Missing);
    }
}
