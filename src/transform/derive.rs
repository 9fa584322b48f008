//! Derived output columns: TIME and DECIMAL.
//!
//! The two derivations are independent and independently reported. Either
//! can be skipped without affecting the other or the rest of the run.

use super::{DATE_COLUMN, DECIMAL_COLUMN, DECIMAL_OPERANDS, TIME_COLUMN};
use crate::error::{TransformError, TransformResult};
use crate::models::{row_cell, Cell, Table};

/// Copy `FECHA Y HORA` verbatim into the `TIME` output column.
///
/// No parsing, no reformatting: the raw text is preserved exactly, textual
/// ambiguity included, rather than risking misinterpretation by a date
/// system. Returns whether the column was added; when the source column is
/// absent the table is left untouched.
pub fn derive_time(table: &mut Table) -> bool {
    if !table.has_column(DATE_COLUMN) {
        return false;
    }

    let values: Vec<Cell> = table
        .rows
        .iter()
        .map(|row| row_cell(row, DATE_COLUMN).clone())
        .collect();
    table.push_column(TIME_COLUMN, values);
    true
}

/// Compute `DECIMAL = VALOR_FUGA * 10.0^EXPONENCIAL` row-wise.
///
/// The base is `10.0` (not an integer power) so negative exponents come out
/// right. Rows where either operand is missing or non-numeric get a
/// `Missing` cell. Both operand columns must exist in the table; otherwise
/// the derivation is skipped with a [`TransformError::MissingColumn`] that
/// the pipeline surfaces while still completing the run.
pub fn derive_decimal(table: &mut Table) -> TransformResult<()> {
    let absent: Vec<&str> = DECIMAL_OPERANDS
        .iter()
        .copied()
        .filter(|col| !table.has_column(col))
        .collect();
    if !absent.is_empty() {
        return Err(TransformError::MissingColumn(absent.join(", ")));
    }

    let [base_col, exp_col] = DECIMAL_OPERANDS;
    let values: Vec<Cell> = table
        .rows
        .iter()
        .map(|row| {
            let base = row_cell(row, base_col).as_number();
            let exponent = row_cell(row, exp_col).as_number();
            match (base, exponent) {
                (Some(base), Some(exponent)) => Cell::Number(base * 10.0_f64.powf(exponent)),
                _ => Cell::Missing,
            }
        })
        .collect();
    table.push_column(DECIMAL_COLUMN, values);
    Ok(())
}
