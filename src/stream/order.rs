//! Vertical stacking order
//!
//! Two strategies share the `StackOrder` interface:
//! - `TimeSeriesOrder`: ranks labels per x column by value; ties keep the
//!   relative order the tied labels had in the previous column
//! - `CumulativeAreaOrder`: ranks labels once by the area under their curve
//!   and uses that rank at every x

use super::grid::CompletedGrid;
use std::cmp::Ordering;

/// Direction in which values are stacked within a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackDirection {
    /// Smallest value gets order 0
    Ascending,
    /// Largest value gets order 0
    #[default]
    Descending,
}

impl StackDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// Compare two finite magnitudes in stacking order
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Ascending => a.total_cmp(&b),
            Self::Descending => b.total_cmp(&a),
        }
    }
}

/// Assigns every grid cell its rank within its x column
pub trait StackOrder {
    /// Returns ranks laid out like the grid: `ranks[x * n_labels + label]`
    fn assign(&self, grid: &CompletedGrid, direction: StackDirection) -> Vec<usize>;
}

/// Select the ordering strategy
pub fn strategy(time_series: bool) -> &'static dyn StackOrder {
    if time_series {
        &TimeSeriesOrder
    } else {
        &CumulativeAreaOrder
    }
}

/// Per-column ordering with tie-break-by-predecessor
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesOrder;

impl StackOrder for TimeSeriesOrder {
    fn assign(&self, grid: &CompletedGrid, direction: StackDirection) -> Vec<usize> {
        let n_labels = grid.n_labels();

        // Fold over x columns in axis order; the accumulator carries the
        // previous column's label -> rank mapping.
        let (ranks, _) = (0..grid.n_x()).fold(
            (Vec::with_capacity(grid.len()), None::<Vec<usize>>),
            |(mut ranks, previous), x| {
                let column = grid.column(x);
                let mut stacked: Vec<usize> = (0..n_labels).collect();

                // Stable sort: first-column ties keep label first-appearance order
                stacked.sort_by(|&a, &b| {
                    direction
                        .compare(column[a], column[b])
                        .then_with(|| match &previous {
                            Some(prev) => prev[a].cmp(&prev[b]),
                            None => Ordering::Equal,
                        })
                });

                let column_ranks = invert(&stacked);
                ranks.extend_from_slice(&column_ranks);
                (ranks, Some(column_ranks))
            },
        );

        ranks
    }
}

/// One global order per label, from its trapezoidal area
#[derive(Debug, Clone, Copy, Default)]
pub struct CumulativeAreaOrder;

impl StackOrder for CumulativeAreaOrder {
    fn assign(&self, grid: &CompletedGrid, direction: StackDirection) -> Vec<usize> {
        let positions = grid.axis().positions();
        let areas: Vec<f64> = (0..grid.n_labels())
            .map(|label| {
                let values: Vec<f64> = grid.series(label).collect();
                trapezoid(positions, &values)
            })
            .collect();

        tracing::debug!(?areas, "label areas for cumulative order");

        let mut stacked: Vec<usize> = (0..grid.n_labels()).collect();
        stacked.sort_by(|&a, &b| direction.compare(areas[a], areas[b]));
        let label_ranks = invert(&stacked);

        (0..grid.n_x())
            .flat_map(|_| label_ranks.iter().copied())
            .collect()
    }
}

/// Signed area under a piecewise-linear curve (trapezoidal rule)
///
/// Fewer than two points enclose no area.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// Turn a list of labels in stacking order into label -> rank
fn invert(stacked: &[usize]) -> Vec<usize> {
    let mut ranks = vec![0; stacked.len()];
    for (rank, &label) in stacked.iter().enumerate() {
        ranks[label] = rank;
    }
    ranks
}
