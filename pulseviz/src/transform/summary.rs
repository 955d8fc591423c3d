//! Per-category distribution statistics of pulse, as drawn by box plots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Category, Dimension, TidyTable};

/// Distribution of `pulse` within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub category: Category,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl GroupSummary {
    /// Summary of a non-empty group; `None` when `values` is empty.
    pub fn from_values(category: Category, values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        Some(Self {
            category,
            count: values.len(),
            min: values[0],
            q1: quantile(values, 0.25),
            median: quantile(values, 0.5),
            q3: quantile(values, 0.75),
            max: values[values.len() - 1],
            mean: values.iter().sum::<f64>() / values.len() as f64,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quantile of sorted values, interpolating linearly between closest ranks.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Summarize pulse per category of `by`, categories in natural order.
pub fn summarize(tidy: &TidyTable, by: Dimension) -> Vec<GroupSummary> {
    values_by(tidy, by)
        .into_iter()
        .filter_map(|(category, mut values)| GroupSummary::from_values(category, &mut values))
        .collect()
}

/// Pulse values of each category of `by`, in the same order as [`summarize`].
pub fn values_by(tidy: &TidyTable, by: Dimension) -> Vec<(Category, Vec<f64>)> {
    let mut groups: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for record in tidy {
        groups.entry(by.category_of(record)).or_default().push(record.pulse);
    }
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubjectId, TidyRecord, TimeOffset};

    fn tidy(rows: &[(&str, &str, TimeOffset, f64)]) -> TidyTable {
        rows.iter()
            .enumerate()
            .map(|(i, (diet, exercise, time, pulse))| TidyRecord {
                id: SubjectId::new(i.to_string()),
                diet: diet.to_string(),
                exercise: exercise.to_string(),
                time: *time,
                pulse: *pulse,
            })
            .collect()
    }

    #[test]
    fn test_quartiles_interpolate() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        let s = GroupSummary::from_values(Category::Label("x".into()), &mut values).unwrap();

        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.iqr(), 1.5);
    }

    #[test]
    fn test_single_value_group() {
        let mut values = vec![85.0];
        let s = GroupSummary::from_values(Category::Label("x".into()), &mut values).unwrap();
        assert_eq!((s.q1, s.median, s.q3), (85.0, 85.0, 85.0));
    }

    #[test]
    fn test_empty_group_has_no_summary() {
        assert!(GroupSummary::from_values(Category::Label("x".into()), &mut []).is_none());
    }

    #[test]
    fn test_summarize_by_diet() {
        let t = tidy(&[
            ("no fat", "rest", TimeOffset::OneMin, 90.0),
            ("low fat", "rest", TimeOffset::OneMin, 80.0),
            ("low fat", "running", TimeOffset::OneMin, 100.0),
        ]);

        let summaries = summarize(&t, Dimension::Diet);
        let labels: Vec<&str> = summaries.iter().map(|s| s.category.label()).collect();

        assert_eq!(labels, vec!["low fat", "no fat"]);
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].mean, 90.0);
    }

    #[test]
    fn test_summarize_by_time_is_chronological() {
        let t = tidy(&[
            ("low fat", "rest", TimeOffset::ThirtyMin, 88.0),
            ("low fat", "rest", TimeOffset::OneMin, 85.0),
            ("low fat", "rest", TimeOffset::FifteenMin, 86.0),
        ]);

        let labels: Vec<String> = summarize(&t, Dimension::Time)
            .iter()
            .map(|s| s.category.to_string())
            .collect();
        assert_eq!(labels, vec!["1 min", "15 min", "30 min"]);
    }

    #[test]
    fn test_values_by_matches_summaries() {
        let t = tidy(&[
            ("low fat", "walking", TimeOffset::OneMin, 95.0),
            ("low fat", "rest", TimeOffset::OneMin, 80.0),
        ]);

        let values = values_by(&t, Dimension::Exercise);
        let summaries = summarize(&t, Dimension::Exercise);

        assert_eq!(values.len(), summaries.len());
        for ((category, v), s) in values.iter().zip(&summaries) {
            assert_eq!(category, &s.category);
            assert_eq!(v.len(), s.count);
        }
    }

    #[test]
    fn test_empty_table() {
        assert!(summarize(&TidyTable::default(), Dimension::Exercise).is_empty());
    }
}
