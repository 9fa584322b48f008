//! One request-scoped consolidation run, end to end.
//!
//! The pipeline is synchronous and single-threaded: files are processed
//! front to back, intermediate tables live only inside [`run`], and no
//! state survives between runs. Every recoverable failure is absorbed into
//! the [`RunReport`]; the only hard errors are "nothing loaded" and "both
//! export paths failed".
//!
//! ```text
//! raw files → normalized record sets → consolidated table → sorted
//!           → TIME/DECIMAL derived → XLSX artifact
//! ```

use serde::Serialize;

use super::{attach_sort_keys, consolidate, derive_decimal, derive_time, normalize, sort_by_timestamp};
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::export::{self, ExportOutcome};
use crate::models::Table;
use crate::parser::parse_export;

/// One uploaded file: its name (diagnostics only) and raw bytes.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Load outcome for one uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    /// Uploaded filename.
    pub file: String,
    /// Rows contributed to the consolidated table (zero on failure).
    pub rows: usize,
    /// Load failure reason, when the file was skipped.
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_loaded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of the two independent derivations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationReport {
    /// TIME column added (source date column was present).
    pub time_applied: bool,
    /// DECIMAL column added (both operand columns were present).
    pub decimal_applied: bool,
    /// Reason DECIMAL was skipped, surfaced to the operator.
    pub decimal_error: Option<String>,
}

/// Everything one run produced: per-file outcomes, the final table, the
/// derivation report, and the exported artifact.
#[derive(Debug)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    pub table: Table,
    pub derivations: DerivationReport,
    pub export: ExportOutcome,
    pub artifact: Vec<u8>,
}

impl RunReport {
    /// Files that contributed rows.
    pub fn loaded_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_loaded()).count()
    }
}

/// Run the whole pipeline over one batch of uploads.
///
/// Files that fail to load are recorded and skipped; the run continues
/// with the rest. Returns [`PipelineError::NoFilesLoaded`] only when every
/// file failed, carrying the per-file reasons.
pub fn run(files: Vec<FileInput>) -> PipelineResult<RunReport> {
    log_info(format!("Processing {} uploaded file(s)...", files.len()));

    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(files.len());
    let mut sets = Vec::with_capacity(files.len());

    for file in files {
        match parse_export(&file.name, &file.bytes) {
            Ok(mut set) => {
                normalize(&mut set);
                attach_sort_keys(&mut set);
                log_success(format!("{}: {} rows", file.name, set.rows.len()));
                outcomes.push(FileOutcome {
                    file: file.name,
                    rows: set.rows.len(),
                    error: None,
                });
                sets.push(set);
            }
            Err(err) => {
                log_error(format!("{}: {}", file.name, err));
                outcomes.push(FileOutcome {
                    file: file.name,
                    rows: 0,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    if sets.is_empty() {
        let failures = outcomes
            .into_iter()
            .map(|o| (o.file, o.error.unwrap_or_default()))
            .collect();
        return Err(PipelineError::NoFilesLoaded(failures));
    }

    let mut table = consolidate(sets);
    log_info(format!(
        "Consolidated: {} rows, {} columns",
        table.rows.len(),
        table.columns.len()
    ));

    sort_by_timestamp(&mut table);
    if table.has_timestamp_source {
        log_success("Sorted by machine timestamp (unparsable dates last)");
    } else {
        log_warning("No date column in any input; keeping file order");
    }

    let time_applied = derive_time(&mut table);
    if time_applied {
        log_success("TIME column copied verbatim from FECHA Y HORA");
    }

    let decimal_error = match derive_decimal(&mut table) {
        Ok(()) => {
            log_success("DECIMAL column computed (VALOR_FUGA * 10^EXPONENCIAL)");
            None
        }
        Err(err) => {
            log_error(format!("DECIMAL skipped: {}", err));
            Some(err.to_string())
        }
    };
    let derivations = DerivationReport {
        time_applied,
        decimal_applied: decimal_error.is_none(),
        decimal_error,
    };

    let (artifact, export_outcome) = export::export(&table)?;
    match &export_outcome {
        ExportOutcome::Formatted => log_success("Spreadsheet exported with conditional styling"),
        ExportOutcome::Plain { reason } => {
            log_warning(format!("Styled export failed, plain fallback used: {}", reason))
        }
    }

    Ok(RunReport {
        files: outcomes,
        table,
        derivations,
        export: export_outcome,
        artifact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use crate::transform::{DECIMAL_COLUMN, TIME_COLUMN};

    fn export_file(body: &str) -> Vec<u8> {
        format!("MAQUINA DE FUGAS v2\nSERIE 0042\n{}", body).into_bytes()
    }

    fn machine_file(rows: &[(&str, &str, &str)]) -> Vec<u8> {
        let mut body = String::from("FECHA Y HORA,VALOR_FUGA,EXPONENCIAL\n");
        for (date, base, exp) in rows {
            body.push_str(&format!("{},{},{}\n", date, base, exp));
        }
        export_file(&body)
    }

    #[test]
    fn test_scenario_two_files_merge_sorted() {
        // Two files, 3 rows each, non-overlapping timestamps, second file
        // earlier than the first.
        let late = machine_file(&[
            ("04-01-10:00:00", "1", "0"),
            ("04-02-10:00:00", "2", "0"),
            ("04-03-10:00:00", "3", "0"),
        ]);
        let early = machine_file(&[
            ("01-01-10:00:00", "4", "0"),
            ("01-02-10:00:00", "5", "0"),
            ("01-03-10:00:00", "6", "0"),
        ]);

        let report = run(vec![
            FileInput::new("late.csv", late),
            FileInput::new("early.csv", early),
        ])
        .unwrap();

        assert_eq!(report.table.rows.len(), 6);
        let order: Vec<f64> = (0..6)
            .map(|i| report.table.cell(i, "VALOR_FUGA").as_number().unwrap())
            .collect();
        assert_eq!(order, vec![4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
        assert!(!report.artifact.is_empty());
    }

    #[test]
    fn test_scenario_decimal_negative_exponent() {
        let file = machine_file(&[("01-01-00:00:00", "5", "-3")]);
        let report = run(vec![FileInput::new("m.csv", file)]).unwrap();

        let value = report.table.cell(0, DECIMAL_COLUMN).as_number().unwrap();
        assert!((value - 0.005).abs() < 1e-12);
        assert!(report.derivations.decimal_applied);
    }

    #[test]
    fn test_scenario_missing_exponent_column() {
        let body = "FECHA Y HORA,VALOR_FUGA\n01-01-00:00:00,5\n";
        let report = run(vec![FileInput::new("m.csv", export_file(body))]).unwrap();

        assert!(!report.table.has_column(DECIMAL_COLUMN));
        assert!(report.table.has_column(TIME_COLUMN));
        assert!(!report.derivations.decimal_applied);
        let reason = report.derivations.decimal_error.unwrap();
        assert!(reason.contains("EXPONENCIAL"));
        // The run still exported an artifact.
        assert!(!report.artifact.is_empty());
    }

    #[test]
    fn test_scenario_one_corrupt_file_of_two() {
        let good = machine_file(&[("01-01-00:00:00", "1", "0"), ("01-02-00:00:00", "2", "0")]);
        let corrupt = b"\x00".to_vec();

        let report = run(vec![
            FileInput::new("good.csv", good),
            FileInput::new("corrupt.csv", corrupt),
        ])
        .unwrap();

        assert_eq!(report.table.rows.len(), 2);
        assert_eq!(report.loaded_count(), 1);
        let failed = report.files.iter().find(|f| f.file == "corrupt.csv").unwrap();
        assert!(failed.error.is_some());
        assert_eq!(failed.rows, 0);
    }

    #[test]
    fn test_row_count_invariant() {
        let a = machine_file(&[("01-01-00:00:00", "1", "0")]);
        let b = machine_file(&[
            ("02-01-00:00:00", "2", "0"),
            ("02-02-00:00:00", "3", "0"),
        ]);
        let report = run(vec![FileInput::new("a.csv", a), FileInput::new("b.csv", b)]).unwrap();

        let loaded_rows: usize = report.files.iter().map(|f| f.rows).sum();
        assert_eq!(report.table.rows.len(), loaded_rows);
        assert_eq!(report.table.rows.len(), 3);
    }

    #[test]
    fn test_time_column_verbatim() {
        let file = machine_file(&[("12-31-23:59:59", "1", "0")]);
        let report = run(vec![FileInput::new("m.csv", file)]).unwrap();

        assert_eq!(
            report.table.cell(0, TIME_COLUMN),
            &Cell::Text("12-31-23:59:59".into())
        );
    }

    #[test]
    fn test_no_files_loaded_is_the_only_total_failure() {
        let err = run(vec![FileInput::new("empty.csv", Vec::new())]).unwrap_err();
        match err {
            PipelineError::NoFilesLoaded(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, "empty.csv");
                assert!(failures[0].1.contains("empty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_designated_columns_hold_numbers_or_missing_only() {
        let file = machine_file(&[
            ("01-01-00:00:00", "5", "-3"),
            ("01-02-00:00:00", "ERR", "2"),
        ]);
        let report = run(vec![FileInput::new("m.csv", file)]).unwrap();

        for i in 0..report.table.rows.len() {
            for col in crate::transform::NUMERIC_COLUMNS {
                if report.table.has_column(col) {
                    let cell = report.table.cell(i, col);
                    assert!(
                        cell.as_number().is_some() || cell.is_missing(),
                        "{col} row {i} held {cell:?}"
                    );
                }
            }
        }
    }
}
