//! Transformation stages for the consolidation pipeline.
//!
//! - Normalize: column-name trimming and best-effort numeric coercion
//! - Timestamp: ephemeral sort key from the machine date column
//! - Consolidate: union-of-columns merge of all record sets
//! - Sort: stable ordering by the ephemeral key
//! - Derive: the TIME and DECIMAL output columns
//! - Pipeline: one request-scoped run, end to end

pub mod consolidate;
pub mod derive;
pub mod normalize;
pub mod pipeline;
pub mod sort;
pub mod timestamp;

pub use consolidate::consolidate;
pub use derive::{derive_decimal, derive_time};
pub use normalize::normalize;
pub use pipeline::{run, FileInput, FileOutcome, RunReport};
pub use sort::sort_by_timestamp;
pub use timestamp::attach_sort_keys;

// =============================================================================
// Machine export vocabulary
// =============================================================================

/// Free-text date/time column written by the bench firmware.
pub const DATE_COLUMN: &str = "FECHA Y HORA";

/// Columns coerced to numeric before consolidation.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "VALOR_FUGA",
    "EXPONENCIAL",
    "ESTADO",
    "CALIBRACION",
    "DUMMY TEST",
    "FUGA CALIBRADA",
];

/// Status-like columns that receive conditional styling in the export.
pub const STATUS_COLUMNS: [&str; 4] = ["ESTADO", "CALIBRACION", "DUMMY TEST", "FUGA CALIBRADA"];

/// Derived output column holding the verbatim date text.
pub const TIME_COLUMN: &str = "TIME";

/// Derived output column holding the computed leak value.
pub const DECIMAL_COLUMN: &str = "DECIMAL";

/// Operand columns of the DECIMAL derivation.
pub const DECIMAL_OPERANDS: [&str; 2] = ["VALOR_FUGA", "EXPONENCIAL"];
