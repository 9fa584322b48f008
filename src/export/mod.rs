//! XLSX export of the consolidated table.
//!
//! The table is written as a single sheet, header row plus data rows, no
//! index column. Styling is declarative: a list of `(column, match-value,
//! format)` rules computed up front and applied as conditional formats,
//! fully separate from the row-writing step — which is what lets the plain
//! fallback reuse the same writer and simply skip rule application.

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, Format, Workbook, Worksheet,
};
use serde::Serialize;

use crate::error::{ExportError, ExportResult};
use crate::models::{Cell, Table};
use crate::transform::STATUS_COLUMNS;

/// Sheet holding the consolidated data.
pub const SHEET_NAME: &str = "Consolidado";

/// Fixed download filename of the artifact.
pub const ARTIFACT_FILENAME: &str = "datos_consolidados_analisis.xlsx";

/// MIME type of the artifact.
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// Worksheet capacity of the XLSX format.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// How the artifact was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ExportOutcome {
    /// Primary path: conditional styling applied.
    Formatted,
    /// Fallback path: rows only, with the original failure reason.
    Plain { reason: String },
}

/// One conditional styling rule: cells of `column_index` equal to `value`
/// get `format`.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub column_index: usize,
    pub value: f64,
    pub format: Format,
}

/// Machine status convention: `1` is a pass, `2` is a fail. Any other
/// value (e.g. `3`, "not run") keeps the default look.
const PASS_VALUE: f64 = 1.0;
const FAIL_VALUE: f64 = 2.0;

fn pass_format() -> Format {
    Format::new()
        .set_background_color("C6EFCE")
        .set_font_color("006100")
}

fn fail_format() -> Format {
    Format::new()
        .set_background_color("FFC7CE")
        .set_font_color("9C0006")
}

/// Build the rule list for the designated status columns present in the
/// table. Columns are addressed by numeric index, so tables wider than 26
/// columns style correctly.
pub fn style_rules(table: &Table) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    for column in STATUS_COLUMNS {
        if let Some(column_index) = table.column_index(column) {
            rules.push(StyleRule {
                column_index,
                value: PASS_VALUE,
                format: pass_format(),
            });
            rules.push(StyleRule {
                column_index,
                value: FAIL_VALUE,
                format: fail_format(),
            });
        }
    }
    rules
}

/// Export the table, falling back to the plain writer when the styled path
/// fails. The fallback preserves the original failure reason so the
/// operator learns why styling was dropped while still getting a file.
pub fn export(table: &Table) -> ExportResult<(Vec<u8>, ExportOutcome)> {
    match export_styled(table) {
        Ok(bytes) => Ok((bytes, ExportOutcome::Formatted)),
        Err(err) => plain_fallback(table, err),
    }
}

fn plain_fallback(table: &Table, cause: ExportError) -> ExportResult<(Vec<u8>, ExportOutcome)> {
    let bytes = export_plain(table)?;
    Ok((
        bytes,
        ExportOutcome::Plain {
            reason: cause.to_string(),
        },
    ))
}

/// Primary path: rows plus conditional styling.
pub fn export_styled(table: &Table) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    write_rows(worksheet, table)?;

    if !table.rows.is_empty() {
        let first_data_row = 1u32;
        let last_data_row = cast_row(table.rows.len())?;
        for rule in style_rules(table) {
            let col = cast_col(rule.column_index)?;
            let conditional = ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::EqualTo(rule.value))
                .set_format(&rule.format);
            worksheet.add_conditional_format(first_data_row, col, last_data_row, col, &conditional)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Fallback path: the same rows, no rule application.
pub fn export_plain(table: &Table) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    write_rows(worksheet, table)?;

    Ok(workbook.save_to_buffer()?)
}

/// Header row plus data rows. `Missing` cells stay blank.
fn write_rows(worksheet: &mut Worksheet, table: &Table) -> ExportResult<()> {
    if table.columns.len() > MAX_COLS {
        return Err(ExportError::Overflow(format!(
            "{} columns (max {MAX_COLS})",
            table.columns.len()
        )));
    }
    if table.rows.len() + 1 > MAX_ROWS {
        return Err(ExportError::Overflow(format!(
            "{} rows (max {})",
            table.rows.len(),
            MAX_ROWS - 1
        )));
    }

    for (col_idx, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, cast_col(col_idx)?, name)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = cast_row(row_idx + 1)?;
        for (col_idx, name) in table.columns.iter().enumerate() {
            let sheet_col = cast_col(col_idx)?;
            match crate::models::row_cell(row, name) {
                Cell::Text(text) => {
                    worksheet.write_string(sheet_row, sheet_col, text)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(sheet_row, sheet_col, *n)?;
                }
                Cell::Missing => {}
            }
        }
    }

    Ok(())
}

fn cast_row(value: usize) -> ExportResult<u32> {
    u32::try_from(value).map_err(|_| ExportError::Overflow(format!("row index {value}")))
}

fn cast_col(value: usize) -> ExportResult<u16> {
    u16::try_from(value).map_err(|_| ExportError::Overflow(format!("column index {value}")))
}
