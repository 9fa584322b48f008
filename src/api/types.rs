//! REST API types for the browser UI.
//!
//! The UI only needs what the core exposes: per-file load outcomes, the
//! derivation report, a short row preview, and how the export went. The
//! artifact itself is served as a binary download, not embedded here.

use serde_json::{json, Map, Value};

use crate::export::ExportOutcome;
use crate::transform::pipeline::{DerivationReport, FileOutcome, RunReport};

/// Rows included in the preview payload.
pub const PREVIEW_ROWS: usize = 10;

/// Summary of one consolidation run, returned by `POST /api/preview`.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// "ok" when everything applied cleanly, "warning" otherwise.
    pub status: String,

    /// Rows in the consolidated table.
    pub row_count: usize,

    /// Output columns in spreadsheet order (preview objects do not keep
    /// key order, this does).
    pub columns: Vec<String>,

    /// Per-file load outcomes.
    pub files: Vec<FileOutcome>,

    /// TIME / DECIMAL outcomes.
    pub derivations: DerivationReport,

    /// Formatted export or plain fallback, with reason.
    pub export: ExportOutcome,

    /// First rows of the consolidated table.
    pub preview: Vec<Value>,
}

impl From<&RunReport> for RunSummary {
    fn from(report: &RunReport) -> Self {
        let clean = report.files.iter().all(FileOutcome::is_loaded)
            && report.derivations.decimal_applied
            && matches!(report.export, ExportOutcome::Formatted);

        let preview = report
            .table
            .rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                let mut object = Map::new();
                for column in &report.table.columns {
                    let cell = crate::models::row_cell(row, column);
                    object.insert(column.clone(), json!(cell));
                }
                Value::Object(object)
            })
            .collect();

        RunSummary {
            status: if clean { "ok" } else { "warning" }.to_string(),
            row_count: report.table.rows.len(),
            columns: report.table.columns.clone(),
            files: report.files.clone(),
            derivations: report.derivations.clone(),
            export: report.export.clone(),
            preview,
        }
    }
}

/// JSON body for requests that produced no artifact.
pub fn error_response(error: &str, failures: &[(String, String)]) -> Value {
    json!({
        "status": "error",
        "error": error,
        "files": failures
            .iter()
            .map(|(file, reason)| json!({ "file": file, "error": reason }))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Row, Table};

    fn report() -> RunReport {
        let table = Table {
            columns: vec!["ESTADO".into(), "TIME".into()],
            rows: vec![Row::from([
                ("ESTADO".to_string(), Cell::Number(1.0)),
                ("TIME".to_string(), Cell::Text("01-01-00:00:00".into())),
            ])],
            sort_keys: vec![],
            has_timestamp_source: true,
        };
        RunReport {
            files: vec![FileOutcome {
                file: "m.csv".into(),
                rows: 1,
                error: None,
            }],
            table,
            derivations: DerivationReport {
                time_applied: true,
                decimal_applied: true,
                decimal_error: None,
            },
            export: ExportOutcome::Formatted,
            artifact: vec![0x50, 0x4b],
        }
    }

    #[test]
    fn test_clean_run_is_ok() {
        let summary = RunSummary::from(&report());
        assert_eq!(summary.status, "ok");
        assert_eq!(summary.row_count, 1);
        assert_eq!(summary.preview.len(), 1);
        assert_eq!(summary.preview[0]["ESTADO"], json!(1.0));
        assert_eq!(summary.preview[0]["TIME"], json!("01-01-00:00:00"));
    }

    #[test]
    fn test_degraded_run_is_warning() {
        let mut r = report();
        r.derivations.decimal_applied = false;
        r.derivations.decimal_error = Some("Missing source column(s): EXPONENCIAL".into());

        let summary = RunSummary::from(&r);
        assert_eq!(summary.status, "warning");
    }

    #[test]
    fn test_preview_capped_at_ten_rows() {
        let mut r = report();
        let row = r.table.rows[0].clone();
        r.table.rows = vec![row; 25];

        let summary = RunSummary::from(&r);
        assert_eq!(summary.row_count, 25);
        assert_eq!(summary.preview.len(), PREVIEW_ROWS);
    }

    #[test]
    fn test_error_response_lists_per_file_reasons() {
        let body = error_response(
            "No input file loaded successfully (1 failed)",
            &[("bad.csv".to_string(), "CSV file is empty".to_string())],
        );
        assert_eq!(body["status"], "error");
        assert_eq!(body["files"][0]["file"], "bad.csv");
    }
}
