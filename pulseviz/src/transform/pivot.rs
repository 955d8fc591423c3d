//! Pivot aggregation over two categorical dimensions of a tidy table.
//!
//! Combinations with no rows are [`Cell::NoData`], never `0.0`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;
use crate::models::{Category, Dimension, TidyTable, PULSE_COLUMN};

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregate applied to the values of one (row, column) group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Count,
}

impl Aggregation {
    pub const ALL: [Aggregation; 6] = [
        Aggregation::Mean,
        Aggregation::Median,
        Aggregation::Min,
        Aggregation::Max,
        Aggregation::Sum,
        Aggregation::Count,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
        }
    }

    /// Aggregate a group. Values are sorted first, so the result is
    /// independent of input order.
    pub fn apply(&self, values: &mut [f64]) -> Cell {
        if values.is_empty() {
            return Cell::NoData;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let value = match self {
            Aggregation::Mean => values.iter().sum::<f64>() / n as f64,
            Aggregation::Median => {
                if n % 2 == 1 {
                    values[n / 2]
                } else {
                    (values[n / 2 - 1] + values[n / 2]) / 2.0
                }
            }
            Aggregation::Min => values[0],
            Aggregation::Max => values[n - 1],
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Count => n as f64,
        };
        Cell::Value(value)
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s || (s == "avg" && *a == Aggregation::Mean))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|a| a.name()).collect();
                format!("Unknown aggregation '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Cell
// =============================================================================

/// One pivot cell: an aggregate, or explicitly no data.
///
/// Serialized as a number, or `null` for no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Cell {
    Value(f64),
    NoData,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Cell::NoData)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::NoData, Cell::Value)
    }
}

impl From<Cell> for Option<f64> {
    fn from(cell: Cell) -> Self {
        cell.value()
    }
}

// =============================================================================
// Pivot View
// =============================================================================

/// Two-dimensional aggregation of a tidy table.
///
/// `cells[r][c]` belongs to `rows[r]` × `columns[c]`. Rows and columns are the
/// categories present in the data, in natural order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotView {
    pub row_key: Dimension,
    pub col_key: Dimension,
    pub value_column: String,
    pub aggregation: Aggregation,
    pub rows: Vec<Category>,
    pub columns: Vec<Category>,
    pub cells: Vec<Vec<Cell>>,
}

impl PivotView {
    pub fn row_labels(&self) -> Vec<String> {
        self.rows.iter().map(|c| c.label().to_string()).collect()
    }

    pub fn column_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label().to_string()).collect()
    }

    /// Cell at (row label, column label); `None` if either label is absent.
    pub fn get(&self, row: &str, column: &str) -> Option<Cell> {
        let r = self.rows.iter().position(|c| c.label() == row)?;
        let c = self.columns.iter().position(|c| c.label() == column)?;
        Some(self.cells[r][c])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Smallest and largest aggregate, ignoring no-data cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .filter_map(Cell::value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Aligned text rendering, `-` for no data.
impl fmt::Display for PivotView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = format!("{} \\ {}", self.row_key, self.col_key);
        let formatted: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Value(v) => format!("{:.2}", v),
                        Cell::NoData => "-".to_string(),
                    })
                    .collect()
            })
            .collect();

        let first_width = self
            .rows
            .iter()
            .map(|r| r.label().len())
            .chain(std::iter::once(corner.len()))
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, col)| {
                formatted
                    .iter()
                    .map(|row| row[c].len())
                    .chain(std::iter::once(col.label().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:<w$}", corner, w = first_width)?;
        for (col, w) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>w$}", col.label(), w = *w)?;
        }
        writeln!(f)?;

        for (row, values) in self.rows.iter().zip(&formatted) {
            write!(f, "{:<w$}", row.label(), w = first_width)?;
            for (value, w) in values.iter().zip(&widths) {
                write!(f, "  {:>w$}", value, w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// Pivot
// =============================================================================

/// Pivot a tidy table by column names.
///
/// `row_key` and `col_key` must be distinct columns among `diet`, `exercise`
/// and `time`; `value_col` must be the numeric `pulse` column.
pub fn pivot(
    tidy: &TidyTable,
    row_key: &str,
    col_key: &str,
    value_col: &str,
    aggregation: Aggregation,
) -> Result<PivotView, KeyError> {
    let row_dim: Dimension = row_key.parse()?;
    let col_dim: Dimension = col_key.parse()?;

    if value_col.trim() != PULSE_COLUMN {
        return Err(if tidy.has_column(value_col.trim()) {
            KeyError::NotNumeric(value_col.to_string())
        } else {
            KeyError::UnknownColumn(value_col.to_string())
        });
    }

    pivot_by(tidy, row_dim, col_dim, aggregation)
}

/// Mean pulse by two columns, the default pivot.
pub fn pivot_mean(tidy: &TidyTable, row_key: &str, col_key: &str) -> Result<PivotView, KeyError> {
    pivot(tidy, row_key, col_key, PULSE_COLUMN, Aggregation::Mean)
}

/// Pivot a tidy table by typed dimensions.
pub fn pivot_by(
    tidy: &TidyTable,
    row_key: Dimension,
    col_key: Dimension,
    aggregation: Aggregation,
) -> Result<PivotView, KeyError> {
    if row_key == col_key {
        return Err(KeyError::SameKey(row_key.column().to_string()));
    }

    let mut groups: BTreeMap<(Category, Category), Vec<f64>> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();

    for record in tidy {
        let r = row_key.category_of(record);
        let c = col_key.category_of(record);
        rows.insert(r.clone());
        columns.insert(c.clone());
        groups.entry((r, c)).or_default().push(record.pulse);
    }

    let aggregated: BTreeMap<(Category, Category), Cell> = groups
        .into_iter()
        .map(|(key, mut values)| (key, aggregation.apply(&mut values)))
        .collect();

    let rows: Vec<Category> = rows.into_iter().collect();
    let columns: Vec<Category> = columns.into_iter().collect();

    let cells = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| {
                    aggregated
                        .get(&(r.clone(), c.clone()))
                        .copied()
                        .unwrap_or(Cell::NoData)
                })
                .collect()
        })
        .collect();

    Ok(PivotView {
        row_key,
        col_key,
        value_column: PULSE_COLUMN.to_string(),
        aggregation,
        rows,
        columns,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawTable, SubjectId, TidyRecord, TimeOffset};
    use crate::transform::to_tidy;
    use proptest::prelude::*;

    fn record(id: &str, diet: &str, exercise: &str, time: TimeOffset, pulse: f64) -> TidyRecord {
        TidyRecord {
            id: SubjectId::new(id),
            diet: diet.to_string(),
            exercise: exercise.to_string(),
            time,
            pulse,
        }
    }

    fn example_tidy() -> TidyTable {
        let raw = RawTable::from_rows(
            ["id", "diet", "kind", "1 min", "15 min", "30 min"],
            vec![
                ["1", "low", "rest", "80", "78", "76"],
                ["2", "high", "rest", "90", "88", "85"],
            ]
            .into_iter()
            .map(|r| r.iter().map(|v| Some(v.to_string())).collect::<Vec<_>>()),
        );
        to_tidy(&raw).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let tidy = example_tidy();
        assert_eq!(tidy.len(), 6);

        let view = pivot_mean(&tidy, "diet", "exercise").unwrap();

        assert_eq!(view.row_labels(), vec!["high", "low"]);
        assert_eq!(view.column_labels(), vec!["rest"]);
        assert_eq!(view.get("low", "rest"), Some(Cell::Value(78.0)));

        let high = view.get("high", "rest").unwrap().value().unwrap();
        assert!((high - 87.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_missing_combination_is_no_data_not_zero() {
        let tidy = TidyTable::new(vec![
            record("1", "low fat", "rest", TimeOffset::OneMin, 85.0),
            record("2", "no fat", "running", TimeOffset::OneMin, 120.0),
        ]);

        let view = pivot_mean(&tidy, "diet", "exercise").unwrap();

        let cell = view.get("low fat", "running").unwrap();
        assert_eq!(cell, Cell::NoData);
        assert_ne!(cell, Cell::Value(0.0));
        assert_eq!(cell.value(), None);
        assert_eq!(view.get("no fat", "running"), Some(Cell::Value(120.0)));
    }

    #[test]
    fn test_no_data_serializes_as_null() {
        let json = serde_json::to_string(&vec![Cell::Value(1.5), Cell::NoData]).unwrap();
        assert_eq!(json, "[1.5,null]");
        let back: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Cell::Value(1.5), Cell::NoData]);
    }

    #[test]
    fn test_time_rows_are_chronological() {
        let tidy = TidyTable::new(vec![
            record("1", "low fat", "rest", TimeOffset::ThirtyMin, 88.0),
            record("1", "low fat", "rest", TimeOffset::OneMin, 85.0),
            record("1", "low fat", "rest", TimeOffset::FifteenMin, 86.0),
        ]);

        let view = pivot_mean(&tidy, "time", "exercise").unwrap();
        assert_eq!(view.row_labels(), vec!["1 min", "15 min", "30 min"]);
    }

    #[test]
    fn test_string_labels_are_lexicographic() {
        let tidy = TidyTable::new(vec![
            record("1", "no fat", "walking", TimeOffset::OneMin, 90.0),
            record("2", "low fat", "rest", TimeOffset::OneMin, 85.0),
            record("3", "low fat", "running", TimeOffset::OneMin, 110.0),
        ]);

        let view = pivot_mean(&tidy, "diet", "exercise").unwrap();
        assert_eq!(view.row_labels(), vec!["low fat", "no fat"]);
        assert_eq!(view.column_labels(), vec!["rest", "running", "walking"]);
    }

    #[test]
    fn test_unknown_key_is_key_error() {
        let tidy = example_tidy();

        assert_eq!(
            pivot_mean(&tidy, "kind", "exercise").unwrap_err(),
            KeyError::UnknownColumn("kind".into())
        );
        assert_eq!(
            pivot_mean(&tidy, "diet", "gender").unwrap_err(),
            KeyError::UnknownColumn("gender".into())
        );
    }

    #[test]
    fn test_same_key_rejected() {
        let err = pivot_mean(&example_tidy(), "diet", "diet").unwrap_err();
        assert_eq!(err, KeyError::SameKey("diet".into()));
    }

    #[test]
    fn test_value_column_must_be_pulse() {
        let tidy = example_tidy();
        assert_eq!(
            pivot(&tidy, "diet", "time", "id", Aggregation::Mean).unwrap_err(),
            KeyError::NotNumeric("id".into())
        );
        assert_eq!(
            pivot(&tidy, "diet", "time", "heart_rate", Aggregation::Mean).unwrap_err(),
            KeyError::UnknownColumn("heart_rate".into())
        );
    }

    #[test]
    fn test_empty_tidy_gives_empty_view() {
        let view = pivot_mean(&TidyTable::default(), "diet", "exercise").unwrap();
        assert!(view.is_empty());
        assert_eq!(view.value_range(), None);
    }

    #[test]
    fn test_other_aggregations() {
        let tidy = example_tidy();
        let get = |agg| {
            pivot(&tidy, "exercise", "time", "pulse", agg)
                .unwrap()
                .get("rest", "30 min")
                .and_then(|c| c.value())
        };

        assert_eq!(get(Aggregation::Min), Some(76.0));
        assert_eq!(get(Aggregation::Max), Some(85.0));
        assert_eq!(get(Aggregation::Sum), Some(161.0));
        assert_eq!(get(Aggregation::Count), Some(2.0));
        assert_eq!(get(Aggregation::Median), Some(80.5));
    }

    #[test]
    fn test_aggregation_parse() {
        assert_eq!("MEAN".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert_eq!("avg".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("mode".parse::<Aggregation>().unwrap_err().contains("mode"));
    }

    #[test]
    fn test_value_range_skips_no_data() {
        let tidy = TidyTable::new(vec![
            record("1", "low fat", "rest", TimeOffset::OneMin, 85.0),
            record("2", "no fat", "running", TimeOffset::OneMin, 120.0),
        ]);
        let view = pivot_mean(&tidy, "diet", "exercise").unwrap();
        assert_eq!(view.value_range(), Some((85.0, 120.0)));
    }

    #[test]
    fn test_display_table() {
        let view = pivot_mean(&example_tidy(), "diet", "exercise").unwrap();
        let text = view.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("diet \\ exercise"));
        assert!(lines[1].starts_with("high"));
        assert!(lines[1].ends_with("87.67"));
        assert!(lines[2].ends_with("78.00"));
    }

    fn tidy_records() -> impl Strategy<Value = Vec<TidyRecord>> {
        let one = (
            prop::sample::select(vec!["low fat", "no fat"]),
            prop::sample::select(vec!["rest", "walking", "running"]),
            prop::sample::select(TimeOffset::ALL.to_vec()),
            40.0f64..200.0,
        )
            .prop_map(|(diet, exercise, time, pulse)| record("1", diet, exercise, time, pulse));
        prop::collection::vec(one, 0..40)
    }

    proptest! {
        #[test]
        fn prop_pivot_invariant_under_permutation(
            (records, shuffled) in tidy_records().prop_flat_map(|r| {
                let shuffled = Just(r.clone()).prop_shuffle();
                (Just(r), shuffled)
            })
        ) {
            let a = TidyTable::new(records);
            let b = TidyTable::new(shuffled);
            for (row, col) in [("diet", "exercise"), ("time", "exercise"), ("diet", "time")] {
                prop_assert_eq!(pivot_mean(&a, row, col).unwrap(), pivot_mean(&b, row, col).unwrap());
            }
        }

        #[test]
        fn prop_no_data_exactly_where_group_is_empty(records in tidy_records()) {
            let tidy = TidyTable::new(records);
            let view = pivot_mean(&tidy, "diet", "exercise").unwrap();
            for (r, row) in view.rows.iter().enumerate() {
                for (c, col) in view.columns.iter().enumerate() {
                    let present = tidy.iter().any(|t| t.diet == row.label() && t.exercise == col.label());
                    prop_assert_eq!(view.cells[r][c].is_no_data(), !present);
                }
            }
        }
    }
}
