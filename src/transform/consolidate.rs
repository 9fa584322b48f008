//! Union-of-columns merge of all successfully loaded record sets.

use super::DATE_COLUMN;
use crate::models::{RecordSet, Table};

/// Concatenate record sets into one [`Table`], in file-arrival order.
///
/// The column set is the union across inputs in first-seen order; a row
/// lacking a given column simply has no entry for it and reads back as
/// `Missing`. No deduplication, no schema validation. Row count of the
/// result equals the sum of the input row counts.
pub fn consolidate(sets: Vec<RecordSet>) -> Table {
    let mut table = Table::default();

    for set in sets {
        for column in &set.columns {
            if !table.has_column(column) {
                table.columns.push(column.clone());
            }
        }
        if set.has_column(DATE_COLUMN) {
            table.has_timestamp_source = true;
        }
        table.rows.extend(set.rows);
        table.sort_keys.extend(set.sort_keys);
    }

    table
}
