//! Drop incomplete rows from a wide table.

use crate::models::RawTable;

/// Remove every record with a missing value in any column.
///
/// No imputation. Headers are kept as-is, so an empty input (or one where
/// every row is incomplete) yields an empty table with the same schema.
pub fn clean(raw: &RawTable) -> RawTable {
    RawTable {
        headers: raw.headers.clone(),
        records: raw
            .records
            .iter()
            .filter(|r| r.is_complete())
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn test_drops_rows_with_any_missing_cell() {
        let raw = RawTable::from_rows(
            ["id", "diet", "1 min"],
            vec![
                cells(&[Some("1"), Some("low fat"), Some("85")]),
                cells(&[Some("2"), None, Some("90")]),
                cells(&[Some("3"), Some("no fat"), None]),
            ],
        );

        let cleaned = clean(&raw);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.records[0].get(0), Some("1"));
        assert_eq!(cleaned.headers, raw.headers);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let cleaned = clean(&RawTable::default());
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_keeps_source_lines() {
        let raw = RawTable::from_rows(
            ["id"],
            vec![cells(&[None]), cells(&[Some("2")])],
        );
        assert_eq!(clean(&raw).records[0].line, 3);
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(
            rows in prop::collection::vec(
                prop::collection::vec(prop::option::of("[a-z0-9]{1,4}"), 3),
                0..20,
            )
        ) {
            let raw = RawTable::from_rows(["id", "diet", "kind"], rows);
            let once = clean(&raw);
            let twice = clean(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.records.iter().all(|r| r.is_complete()));
        }
    }
}
