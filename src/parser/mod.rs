//! CSV loader for machine leak-test exports.
//!
//! The bench exports a fixed shape: two preamble lines (machine model and
//! firmware banner), the column header on the third line, data after that.
//! Encoding is fixed at Latin-1 by the machine firmware, so decoding is
//! lossless and never fails; structural problems surface as [`LoadError`]
//! and are recorded against the one file without aborting the run.

use csv::ReaderBuilder;

use crate::error::{LoadError, LoadResult};
use crate::models::{Cell, RecordSet, Row};

/// Zero-indexed line carrying the column names. Everything before it is
/// machine preamble and is discarded.
pub const HEADER_ROW_INDEX: usize = 2;

/// Decode machine export bytes.
///
/// The firmware writes Latin-1; Windows-1252 is its byte-complete superset,
/// so every input byte maps to a character and decoding cannot fail.
pub fn decode_export(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Detect the field delimiter by counting occurrences in the header line.
pub fn detect_delimiter(header_line: &str) -> char {
    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = header_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse one uploaded export into a [`RecordSet`].
///
/// * `file` - identifier used in diagnostics (the uploaded filename)
/// * `bytes` - the raw upload
///
/// The first two lines are dropped, line index 2 supplies column names, all
/// later lines are data. Ragged rows are tolerated: extra fields are
/// ignored, short rows read as `Missing` for the trailing columns.
pub fn parse_export(file: &str, bytes: &[u8]) -> LoadResult<RecordSet> {
    let content = decode_export(bytes);

    if content.lines().all(|line| line.trim().is_empty()) {
        return Err(LoadError::EmptyFile);
    }

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= HEADER_ROW_INDEX {
        return Err(LoadError::NoHeader);
    }

    let header_line = lines[HEADER_ROW_INDEX];
    let delimiter = detect_delimiter(header_line);
    let body = lines[HEADER_ROW_INDEX..].join("\n");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .has_headers(true)
        .from_reader(body.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut row = Row::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            let cell = record.get(i).map(Cell::from_raw).unwrap_or(Cell::Missing);
            row.insert(name.clone(), cell);
        }
        rows.push(row);
    }

    Ok(RecordSet::new(file, columns, rows))
}
