//! Stable ordering of the consolidated table by the ephemeral timestamp.

use crate::models::Table;

/// Sort rows ascending by their ephemeral sort key, then discard the keys.
///
/// The sort is stable: rows with equal keys keep their prior relative
/// order. Rows with an unparsable timestamp carry a `None` key and are
/// placed last, in input order — they are never dropped. When no input
/// carried the source date column at all, the table passes through
/// unsorted.
///
/// After this call `sort_keys` is empty; the ephemeral column never
/// reaches the exporter.
pub fn sort_by_timestamp(table: &mut Table) {
    if table.has_timestamp_source {
        let keys = std::mem::take(&mut table.sort_keys);
        let rows = std::mem::take(&mut table.rows);

        let mut keyed: Vec<_> = keys.into_iter().zip(rows).collect();
        keyed.sort_by_key(|(key, _)| (key.is_none(), *key));

        table.rows = keyed.into_iter().map(|(_, row)| row).collect();
    } else {
        table.sort_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Row};
    use crate::transform::timestamp::parse_sort_key;

    fn row(tag: &str) -> Row {
        Row::from([("TAG".to_string(), Cell::Text(tag.into()))])
    }

    fn tags(table: &Table) -> Vec<String> {
        (0..table.rows.len())
            .map(|i| table.cell(i, "TAG").as_text().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_rows_ordered_ascending() {
        let mut table = Table {
            columns: vec!["TAG".into()],
            rows: vec![row("late"), row("early"), row("mid")],
            sort_keys: vec![
                parse_sort_key("06-01-00:00:00"),
                parse_sort_key("01-01-00:00:00"),
                parse_sort_key("03-01-00:00:00"),
            ],
            has_timestamp_source: true,
        };
        sort_by_timestamp(&mut table);

        assert_eq!(tags(&table), vec!["early", "mid", "late"]);
        assert!(table.sort_keys.is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let key = parse_sort_key("01-01-00:00:00");
        let mut table = Table {
            columns: vec!["TAG".into()],
            rows: vec![row("first"), row("second"), row("third")],
            sort_keys: vec![key, key, key],
            has_timestamp_source: true,
        };
        sort_by_timestamp(&mut table);

        assert_eq!(tags(&table), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_missing_keys_sort_last_in_input_order() {
        let mut table = Table {
            columns: vec!["TAG".into()],
            rows: vec![row("bad-a"), row("good"), row("bad-b")],
            sort_keys: vec![None, parse_sort_key("05-05-05:05:05"), None],
            has_timestamp_source: true,
        };
        sort_by_timestamp(&mut table);

        assert_eq!(tags(&table), vec!["good", "bad-a", "bad-b"]);
        assert_eq!(table.rows.len(), 3, "unparsable rows are never dropped");
    }

    #[test]
    fn test_no_source_column_passes_through() {
        let mut table = Table {
            columns: vec!["TAG".into()],
            rows: vec![row("b"), row("a")],
            sort_keys: vec![None, None],
            has_timestamp_source: false,
        };
        sort_by_timestamp(&mut table);

        assert_eq!(tags(&table), vec!["b", "a"]);
        assert!(table.sort_keys.is_empty());
    }
}
