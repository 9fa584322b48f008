//! Error types for the leakmerge consolidation pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`LoadError`] - per-file CSV loading errors
//! - [`TransformError`] - derivation errors over the consolidated table
//! - [`ExportError`] - spreadsheet serialization errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Most failures are recovered close to their origin: a bad file is
//! skipped, a bad cell becomes [`Cell::Missing`], a failed derivation is
//! reported and skipped. Only "no files loaded" and "both export paths
//! failed" escape the pipeline as errors.
//!
//! [`Cell::Missing`]: crate::models::Cell::Missing

use thiserror::Error;

// =============================================================================
// CSV Loading Errors (per file)
// =============================================================================

/// Errors while loading one machine CSV export.
///
/// A `LoadError` never aborts a run: the caller records it against the
/// offending file and continues with the remaining uploads.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File decoded to nothing, or only preamble lines.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Fewer than three lines, so there is no header row to read.
    #[error("No header row at line 3 (machine exports carry a 2-line preamble)")]
    NoHeader,

    /// Structural CSV error from the reader.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during column derivation on the consolidated table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A derivation requires a column the consolidated table never had.
    #[error("Missing source column(s): {0}")]
    MissingColumn(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing the final table to XLSX.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Workbook write error from `rust_xlsxwriter`.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Table exceeds the spreadsheet row or column limits.
    #[error("table does not fit in a worksheet: {0}")]
    Overflow(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
/// Everything recoverable is absorbed into the run report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every uploaded file failed to load; there is nothing to export.
    /// Carries `(file, reason)` pairs for the operator.
    #[error("No input file loaded successfully ({} failed)", .0.len())]
    NoFilesLoaded(Vec<(String, String)>),

    /// Both the styled and the plain export path failed.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for derivations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_into_pipeline_error() {
        let export_err = ExportError::Overflow("1200000 rows".into());
        let pipeline_err: PipelineError = export_err.into();
        assert!(pipeline_err.to_string().contains("1200000 rows"));
    }

    #[test]
    fn test_missing_column_format() {
        let err = TransformError::MissingColumn("VALOR_FUGA, EXPONENCIAL".into());
        assert!(err.to_string().contains("VALOR_FUGA"));
        assert!(err.to_string().contains("EXPONENCIAL"));
    }
}
