//! Dense label × x grid completion
//!
//! Every distinct label gets a cell at every distinct x. Cells without an
//! observation (or with a null value) hold zero.

use super::axis::{CategoryOrder, XAxis};
use super::error::{Result, StreamError};
use super::table::Observations;
use std::collections::HashMap;

/// Completed grid, stored x-major: cell `(x, label)` lives at `x * n_labels + label`
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGrid {
    labels: Vec<String>,
    axis: XAxis,
    values: Vec<f64>,
}

impl CompletedGrid {
    /// Complete the grid for a set of observations
    ///
    /// Labels keep their first-appearance order. A (label, x) pair observed
    /// more than once is rejected.
    pub fn complete(observations: &Observations, category_order: CategoryOrder) -> Result<Self> {
        let (axis, x_rows) = XAxis::from_column(observations.x(), category_order)?;

        let mut label_index: HashMap<&str, usize> = HashMap::new();
        let mut labels: Vec<String> = Vec::new();
        let label_rows: Vec<usize> = observations
            .labels()
            .iter()
            .map(|label| {
                *label_index.entry(label.as_str()).or_insert_with(|| {
                    labels.push(label.clone());
                    labels.len() - 1
                })
            })
            .collect();

        let n_labels = labels.len();
        let mut values = vec![0.0; n_labels * axis.len()];
        let mut seen = vec![false; values.len()];

        for (row, (&xi, &li)) in x_rows.iter().zip(&label_rows).enumerate() {
            let cell = xi * n_labels + li;
            if seen[cell] {
                return Err(StreamError::invalid(format!(
                    "duplicate observation for label '{}' at x={} (row {})",
                    labels[li],
                    axis.keys()[xi],
                    row
                )));
            }
            seen[cell] = true;
            values[cell] = observations.values()[row].unwrap_or(0.0);
        }

        tracing::debug!(
            labels = n_labels,
            x_values = axis.len(),
            observed = observations.len(),
            "completed label x grid"
        );

        Ok(Self {
            labels,
            axis,
            values,
        })
    }

    /// Distinct labels in first-appearance order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn axis(&self) -> &XAxis {
        &self.axis
    }

    pub fn n_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn n_x(&self) -> usize {
        self.axis.len()
    }

    /// Total number of cells (`labels × distinct x`)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values of every label at one x, indexed by label
    pub fn column(&self, x: usize) -> &[f64] {
        let n = self.n_labels();
        &self.values[x * n..(x + 1) * n]
    }

    /// Value of one label at one x
    pub fn value(&self, x: usize, label: usize) -> f64 {
        self.values[x * self.n_labels() + label]
    }

    /// A label's values across the axis
    pub fn series(&self, label: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_x()).map(move |x| self.value(x, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::table::{Observation, XColumn};

    #[test]
    fn test_completion_fills_missing_with_zero() {
        let obs = Observations::from_rows(vec![
            Observation::new("a", 1.0, 3.0),
            Observation::new("a", 2.0, 4.0),
            Observation::new("b", 2.0, 5.0),
            Observation::missing("c", 1.0),
        ])
        .unwrap();

        let grid = CompletedGrid::complete(&obs, CategoryOrder::Appearance).unwrap();

        assert_eq!(grid.labels(), &["a", "b", "c"]);
        assert_eq!(grid.len(), 3 * 2);
        assert_eq!(grid.column(0), &[3.0, 0.0, 0.0]);
        assert_eq!(grid.column(1), &[4.0, 5.0, 0.0]);
        assert_eq!(grid.series(1).collect::<Vec<_>>(), vec![0.0, 5.0]);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let obs = Observations::new(
            vec!["a".into(), "a".into()],
            XColumn::Numeric(vec![1.0, 1.0]),
            vec![Some(1.0), Some(2.0)],
        )
        .unwrap();

        let err = CompletedGrid::complete(&obs, CategoryOrder::Appearance).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
        assert!(err.to_string().contains("duplicate observation for label 'a'"));
    }

    #[test]
    fn test_empty_input() {
        let obs = Observations::from_rows(Vec::new()).unwrap();
        let grid = CompletedGrid::complete(&obs, CategoryOrder::Appearance).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.n_x(), 0);
    }
}
