//! Cumulative band stacking
//!
//! `stack` is the whole transform: grid completion, ordering, padded
//! cumulative bounds and optional centering. It either returns a complete
//! `BandTable` or an `InvalidInput` error; there is no partial result.

use super::axis::{CategoryOrder, XAxis};
use super::error::{Result, StreamError};
use super::grid::CompletedGrid;
use super::order::{self, StackDirection};
use super::table::{Observations, XValue};

/// Parameters of the stacking transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackOptions {
    /// Vertical gap between neighbouring bands (>= 0)
    pub pad: f64,
    /// Stack smallest values first instead of largest
    pub ascending: bool,
    /// Center every column around zero
    pub centered: bool,
    /// Per-column ordering (true) or one global order by area (false)
    pub time_series: bool,
    /// Ranking of categorical x values
    pub category_order: CategoryOrder,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            pad: 0.0,
            ascending: false,
            centered: false,
            time_series: true,
            category_order: CategoryOrder::Appearance,
        }
    }
}

/// One cell of the completed grid with its band
#[derive(Debug, Clone, PartialEq)]
pub struct BandRow {
    pub label: String,
    /// Original x key, kept for axis labelling
    pub x: XValue,
    /// Numeric x position used for interpolation
    pub position: f64,
    pub value: f64,
    pub order: usize,
    pub lb: f64,
    pub ub: f64,
}

/// Augmented table: rows sorted by x, then by order
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    labels: Vec<String>,
    axis: XAxis,
    rows: Vec<BandRow>,
    /// Row index of every (x, label) cell: `slots[x * n_labels + label]`
    slots: Vec<usize>,
    pad: f64,
    centered: bool,
}

/// Stack observations into bands
pub fn stack(observations: &Observations, options: &StackOptions) -> Result<BandTable> {
    if !options.pad.is_finite() || options.pad < 0.0 {
        return Err(StreamError::invalid(format!(
            "padding must be greater or equal to zero, got {}",
            options.pad
        )));
    }

    let grid = CompletedGrid::complete(observations, options.category_order)?;
    let direction = StackDirection::from_ascending(options.ascending);
    let ranks = order::strategy(options.time_series).assign(&grid, direction);

    let n_labels = grid.n_labels();
    let mut rows = Vec::with_capacity(grid.len());
    let mut slots = vec![0; grid.len()];

    for x in 0..grid.n_x() {
        let mut stacked: Vec<usize> = (0..n_labels).collect();
        stacked.sort_by_key(|&label| ranks[x * n_labels + label]);

        let column_start = rows.len();
        let mut cumulative = 0.0;
        let mut previous_ub = -options.pad;

        for (order, &label) in stacked.iter().enumerate() {
            let value = grid.value(x, label);
            cumulative += value;
            let ub = cumulative + options.pad * order as f64;
            let lb = previous_ub + options.pad;
            previous_ub = ub;

            slots[x * n_labels + label] = rows.len();
            rows.push(BandRow {
                label: grid.labels()[label].clone(),
                x: grid.axis().keys()[x].clone(),
                position: grid.axis().positions()[x],
                value,
                order,
                lb,
                ub,
            });
        }

        if options.centered {
            center(&mut rows[column_start..]);
        }
    }

    tracing::debug!(
        rows = rows.len(),
        pad = options.pad,
        centered = options.centered,
        time_series = options.time_series,
        "stacked bands"
    );

    Ok(BandTable {
        labels: grid.labels().to_vec(),
        axis: grid.axis().clone(),
        rows,
        slots,
        pad: options.pad,
        centered: options.centered,
    })
}

/// Shift one column down by half its vertical span
fn center(column: &mut [BandRow]) {
    let max_ub = column.iter().map(|r| r.ub).fold(f64::NEG_INFINITY, f64::max);
    let min_lb = column.iter().map(|r| r.lb).fold(f64::INFINITY, f64::min);
    let shift = (max_ub - min_lb) / 2.0;

    for row in column.iter_mut() {
        row.ub -= shift;
        row.lb -= shift;
    }
}

impl BandTable {
    /// Rows sorted by x, then order
    pub fn rows(&self) -> &[BandRow] {
        &self.rows
    }

    /// Distinct labels in first-appearance order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn axis(&self) -> &XAxis {
        &self.axis
    }

    pub fn pad(&self) -> f64 {
        self.pad
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one x column, in stacking order
    pub fn column(&self, x: usize) -> &[BandRow] {
        let n = self.labels.len();
        &self.rows[x * n..(x + 1) * n]
    }

    /// Rows of one label across the axis, in x order
    pub fn label_rows(&self, label: &str) -> impl Iterator<Item = &BandRow> + '_ {
        let index = self.labels.iter().position(|l| l == label);
        index.into_iter().flat_map(move |i| self.series(i))
    }

    /// Rows of the label at `label` (first-appearance index), in x order
    pub fn series(&self, label: usize) -> impl Iterator<Item = &BandRow> + '_ {
        let n = self.labels.len();
        self.slots
            .iter()
            .skip(label)
            .step_by(n.max(1))
            .map(move |&row| &self.rows[row])
    }
}
