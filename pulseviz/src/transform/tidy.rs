//! Reshape wide pulse records into tidy (long) records.
//!
//! ```text
//! Wide (one row per subject)                 Tidy (one row per subject × offset)
//! ┌────┬─────────┬──────┬───────┬────────┬────────┐    ┌────┬─────────┬──────────┬────────┬───────┐
//! │ id │ diet    │ kind │ 1 min │ 15 min │ 30 min │    │ id │ diet    │ exercise │ time   │ pulse │
//! ├────┼─────────┼──────┼───────┼────────┼────────┤ →  ├────┼─────────┼──────────┼────────┼───────┤
//! │ 1  │ low fat │ rest │ 85    │ 85     │ 88     │    │ 1  │ low fat │ rest     │ 1 min  │ 85    │
//! └────┴─────────┴──────┴───────┴────────┴────────┘    │ 1  │ low fat │ rest     │ 15 min │ 85    │
//!                                                      │ 1  │ low fat │ rest     │ 30 min │ 88    │
//!                                                      └────┴─────────┴──────────┴────────┴───────┘
//! ```

use crate::error::{SchemaError, TransformError, TransformResult};
use crate::models::{
    RawRecord, RawTable, SubjectId, TidyRecord, TidyTable, TimeOffset, DIET_COLUMN, ID_COLUMN,
    KIND_COLUMN, REQUIRED_COLUMNS,
};

/// Positions of the required columns in a wide table.
struct ColumnMap {
    id: usize,
    diet: usize,
    kind: usize,
    offsets: [(TimeOffset, usize); 3],
}

impl ColumnMap {
    fn resolve(raw: &RawTable) -> Result<Self, SchemaError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| raw.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError { missing });
        }

        // All lookups below succeed: every required column was found above.
        let index = |name: &str| raw.column_index(name).unwrap_or_default();
        Ok(Self {
            id: index(ID_COLUMN),
            diet: index(DIET_COLUMN),
            kind: index(KIND_COLUMN),
            offsets: TimeOffset::ALL.map(|t| (t, index(t.label()))),
        })
    }
}

/// Melt a cleaned wide table into tidy records.
///
/// Emits three records per input row, grouped by row and then by
/// chronological offset. `kind` is renamed to `exercise`.
///
/// A table with neither headers nor rows is treated as empty input. Any
/// other table must carry every column of [`REQUIRED_COLUMNS`].
pub fn to_tidy(cleaned: &RawTable) -> TransformResult<TidyTable> {
    if cleaned.headers.is_empty() && cleaned.is_empty() {
        return Ok(TidyTable::default());
    }

    let columns = ColumnMap::resolve(cleaned)?;
    let mut records = Vec::with_capacity(cleaned.len() * TimeOffset::ALL.len());

    for row in &cleaned.records {
        let id = SubjectId::new(cell(row, columns.id, ID_COLUMN)?);
        let diet = cell(row, columns.diet, DIET_COLUMN)?;
        let exercise = cell(row, columns.kind, KIND_COLUMN)?;

        for (time, index) in columns.offsets {
            records.push(TidyRecord {
                id: id.clone(),
                diet: diet.to_string(),
                exercise: exercise.to_string(),
                time,
                pulse: measurement(row, index, time)?,
            });
        }
    }

    Ok(TidyTable::new(records))
}

fn cell<'a>(row: &'a RawRecord, index: usize, column: &str) -> TransformResult<&'a str> {
    row.get(index).ok_or_else(|| TransformError::MissingValue {
        line: row.line,
        column: column.to_string(),
    })
}

fn measurement(row: &RawRecord, index: usize, time: TimeOffset) -> TransformResult<f64> {
    let raw = cell(row, index, time.label())?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TransformError::InvalidValue {
            line: row.line,
            column: time.label().to_string(),
            value: raw.to_string(),
        }),
    }
}
