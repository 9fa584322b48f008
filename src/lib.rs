//! # leakmerge - Machine CSV consolidation and analysis export
//!
//! leakmerge ingests CSV exports from a leak-test bench, consolidates them
//! into one timestamp-ordered table, derives the TIME and DECIMAL analysis
//! columns, and emits a conditionally formatted XLSX spreadsheet for
//! download.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  CSV files  │────▶│   Parser    │────▶│  Transform   │────▶│  XLSX file  │
//! │  (Latin-1)  │     │ (header@3)  │     │ (merge/sort/ │     │ (formatted/ │
//! │             │     │             │     │  derive)     │     │  plain)     │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use leakmerge::{run, FileInput};
//!
//! let report = run(vec![FileInput::new("bench.csv", std::fs::read("bench.csv")?)])?;
//! std::fs::write("datos_consolidados_analisis.xlsx", &report.artifact)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tabular data model (Cell, Row, RecordSet, Table)
//! - [`parser`] - CSV loading with fixed encoding and header offset
//! - [`transform`] - Normalize, timestamp, consolidate, sort, derive, pipeline
//! - [`export`] - XLSX serialization with conditional styling
//! - [`api`] - HTTP API server and SSE log stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Export
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, LoadError, PipelineError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{row_cell, Cell, RecordSet, Row, Table};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_export, detect_delimiter, parse_export, HEADER_ROW_INDEX};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    attach_sort_keys, consolidate, derive_decimal, derive_time, normalize, sort_by_timestamp,
    DATE_COLUMN, DECIMAL_COLUMN, NUMERIC_COLUMNS, STATUS_COLUMNS, TIME_COLUMN,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{run, DerivationReport, FileInput, FileOutcome, RunReport};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{
    export, export_plain, export_styled, ExportOutcome, ARTIFACT_FILENAME, SHEET_NAME, XLSX_MIME,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, RunSummary, PREVIEW_ROWS};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
