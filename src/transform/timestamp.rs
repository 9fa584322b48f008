//! Ephemeral sort key derived from the machine date column.
//!
//! The firmware writes `%m-%d-%H:%M:%S` with no year field, so cross-year
//! ordering is inherently ambiguous; that is an accepted limitation of the
//! source format, not something to repair here. Parsing happens onto a
//! fixed placeholder year so the key is a plain `NaiveDateTime`. Rows whose
//! text does not match keep a `None` key and stay in the output.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::NaiveDateTime;

use super::DATE_COLUMN;
use crate::models::{Cell, RecordSet};

/// Fixed parse pattern of the `FECHA Y HORA` column.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%H:%M:%S";

/// Leap year, so a `02-29` reading stays parsable.
const PLACEHOLDER_YEAR: i32 = 2000;

/// Parse one date cell into a sortable key.
pub fn parse_sort_key(text: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, text.trim(), StrftimeItems::new(TIMESTAMP_FORMAT)).ok()?;
    parsed.set_year(i64::from(PLACEHOLDER_YEAR)).ok()?;
    parsed.to_naive_datetime_with_offset(0).ok()
}

/// Fill the record set's sort keys from its date column.
///
/// A record set without the date column keeps all-`None` keys; the sorter
/// treats those rows as sort-last.
pub fn attach_sort_keys(rs: &mut RecordSet) {
    if !rs.has_column(DATE_COLUMN) {
        return;
    }
    rs.sort_keys = rs
        .rows
        .iter()
        .map(|row| match row.get(DATE_COLUMN) {
            Some(Cell::Text(text)) => parse_sort_key(text),
            _ => None,
        })
        .collect();
}
