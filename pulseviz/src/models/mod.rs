//! Domain models for the pulse analysis pipeline.
//!
//! - [`RawTable`] / [`RawRecord`] - wide table as loaded from CSV
//! - [`TidyTable`] / [`TidyRecord`] - one row per (subject, time offset)
//! - [`TimeOffset`] - the three fixed measurement offsets
//! - [`Dimension`] / [`Category`] - categorical pivot keys and their values
//! - [`SubjectId`] - subject identifier

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

// =============================================================================
// Column names
// =============================================================================

pub const ID_COLUMN: &str = "id";
pub const DIET_COLUMN: &str = "diet";
pub const KIND_COLUMN: &str = "kind";
pub const EXERCISE_COLUMN: &str = "exercise";
pub const TIME_COLUMN: &str = "time";
pub const PULSE_COLUMN: &str = "pulse";

/// Columns a wide table must carry, in schema order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ID_COLUMN,
    DIET_COLUMN,
    KIND_COLUMN,
    "1 min",
    "15 min",
    "30 min",
];

/// Columns of a tidy table.
pub const TIDY_COLUMNS: [&str; 5] = [
    ID_COLUMN,
    DIET_COLUMN,
    EXERCISE_COLUMN,
    TIME_COLUMN,
    PULSE_COLUMN,
];

// =============================================================================
// Time Offset
// =============================================================================

/// Measurement offset after the start of exercise.
///
/// Ordering is chronological, not lexicographic: `"15 min"` sorts after `"1 min"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOffset {
    #[serde(rename = "1 min")]
    OneMin,
    #[serde(rename = "15 min")]
    FifteenMin,
    #[serde(rename = "30 min")]
    ThirtyMin,
}

impl TimeOffset {
    /// All offsets in chronological order.
    pub const ALL: [TimeOffset; 3] = [
        TimeOffset::OneMin,
        TimeOffset::FifteenMin,
        TimeOffset::ThirtyMin,
    ];

    /// Column name of this offset in the wide table.
    pub fn label(&self) -> &'static str {
        match self {
            TimeOffset::OneMin => "1 min",
            TimeOffset::FifteenMin => "15 min",
            TimeOffset::ThirtyMin => "30 min",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label.trim())
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Subject Identifier
// =============================================================================

/// Subject identifier, kept as the trimmed source text.
///
/// Integer ids compare numerically so `"2" < "10"`; anything else compares
/// as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for SubjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SubjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Wide (raw) table
// =============================================================================

/// One data line of the CSV. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    pub cells: Vec<Option<String>>,
}

impl RawRecord {
    pub fn new(line: u64, cells: Vec<Option<String>>) -> Self {
        Self { line, cells }
    }

    /// Cell value at `index`, `None` when missing or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    /// True when every cell carries a value.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

/// Wide-format table: ordered headers plus records aligned to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { headers, records }
    }

    /// Build a table from literal rows, numbering lines from 2 (after the header).
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<String>>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRecord::new(i as u64 + 2, cells.into_iter().collect()))
            .collect();
        Self { headers, records }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Tidy table
// =============================================================================

/// One pulse measurement of one subject at one time offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    pub id: SubjectId,
    pub diet: String,
    pub exercise: String,
    pub time: TimeOffset,
    pub pulse: f64,
}

/// Long-format table of [`TidyRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TidyTable {
    records: Vec<TidyRecord>,
}

impl TidyTable {
    pub fn new(records: Vec<TidyRecord>) -> Self {
        Self { records }
    }

    /// Column names, in output order.
    pub fn columns(&self) -> &'static [&'static str] {
        &TIDY_COLUMNS
    }

    pub fn has_column(&self, name: &str) -> bool {
        TIDY_COLUMNS.contains(&name)
    }

    pub fn records(&self) -> &[TidyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TidyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TidyRecord> {
        self.records
    }
}

impl FromIterator<TidyRecord> for TidyTable {
    fn from_iter<I: IntoIterator<Item = TidyRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRecord;
    type IntoIter = std::slice::Iter<'a, TidyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Pivot dimensions
// =============================================================================

/// Categorical column of the tidy table usable as a pivot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Diet,
    Exercise,
    Time,
}

impl Dimension {
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Diet => DIET_COLUMN,
            Dimension::Exercise => EXERCISE_COLUMN,
            Dimension::Time => TIME_COLUMN,
        }
    }

    /// Value of this dimension for one record.
    pub fn category_of(&self, record: &TidyRecord) -> Category {
        match self {
            Dimension::Diet => Category::Label(record.diet.clone()),
            Dimension::Exercise => Category::Label(record.exercise.clone()),
            Dimension::Time => Category::Time(record.time),
        }
    }
}

impl FromStr for Dimension {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            DIET_COLUMN => Ok(Dimension::Diet),
            EXERCISE_COLUMN => Ok(Dimension::Exercise),
            TIME_COLUMN => Ok(Dimension::Time),
            other => Err(KeyError::UnknownColumn(other.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A value of a [`Dimension`].
///
/// Labels order lexicographically, time offsets chronologically. A single
/// dimension never mixes the two variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Time(TimeOffset),
    Label(String),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::Time(t) => t.label(),
            Category::Label(s) => s,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
