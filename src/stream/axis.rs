//! Distinct x-axis of a streamgraph
//!
//! Orders the distinct x keys and maps each to a numeric position used for
//! area integration and interpolation:
//! - numeric x: the value itself
//! - timestamps: elapsed seconds since the earliest x
//! - categories: sequential rank (first appearance or sorted)

use super::error::{Result, StreamError};
use super::table::{XColumn, XValue};
use chrono::Timelike;
use std::collections::HashMap;

/// How categorical x values are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryOrder {
    /// Rank by order of first appearance in the input
    #[default]
    Appearance,
    /// Rank by lexicographic order
    Sorted,
}

impl CategoryOrder {
    /// Parse from string value
    ///
    /// Validation happens in the property reader; unknown values map to Appearance.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sorted" => Self::Sorted,
            _ => Self::Appearance,
        }
    }
}

/// An x-axis tick: numeric position plus display text
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub text: String,
}

/// Distinct x keys in stacking order, with their numeric positions
#[derive(Debug, Clone, PartialEq)]
pub struct XAxis {
    keys: Vec<XValue>,
    positions: Vec<f64>,
}

impl XAxis {
    /// Build the axis from an x column
    ///
    /// Returns the axis and, for every input row, the index of its x key.
    /// Fails when distinct timestamps fall on the same f64 position, which
    /// happens for nanosecond ticks spread over more than about 104 days.
    pub fn from_column(column: &XColumn, order: CategoryOrder) -> Result<(Self, Vec<usize>)> {
        match column {
            XColumn::Numeric(xs) => {
                let mut distinct = xs.clone();
                distinct.sort_by(f64::total_cmp);
                distinct.dedup();

                let rows = xs
                    .iter()
                    .map(|v| {
                        distinct
                            .binary_search_by(|key| key.total_cmp(v))
                            .unwrap_or_else(|i| i)
                    })
                    .collect();

                let axis = XAxis {
                    keys: distinct.iter().map(|v| XValue::Numeric(*v)).collect(),
                    positions: distinct,
                };
                Ok((axis, rows))
            }
            XColumn::Timestamp { ticks, scale } => {
                let mut distinct = ticks.clone();
                distinct.sort_unstable();
                distinct.dedup();

                let rows = ticks
                    .iter()
                    .map(|t| distinct.binary_search(t).unwrap_or_else(|i| i))
                    .collect();

                let origin = distinct.first().copied().unwrap_or(0);
                let positions: Vec<f64> = distinct
                    .iter()
                    .map(|t| scale.seconds(t.saturating_sub(origin)))
                    .collect();
                if let Some(i) = positions.windows(2).position(|w| w[1] <= w[0]) {
                    return Err(StreamError::invalid(format!(
                        "x resolution too fine: timestamps {} and {} ({:?}) map to the same \
                         position over an axis spanning {} seconds",
                        distinct[i],
                        distinct[i + 1],
                        scale,
                        positions.last().copied().unwrap_or(0.0)
                    )));
                }

                let axis = XAxis {
                    positions,
                    keys: distinct
                        .into_iter()
                        .map(|t| XValue::Timestamp {
                            ticks: t,
                            scale: *scale,
                        })
                        .collect(),
                };
                Ok((axis, rows))
            }
            XColumn::Categorical(names) => {
                let mut index: HashMap<&str, usize> = HashMap::new();
                let mut distinct: Vec<&str> = Vec::new();
                let mut rows: Vec<usize> = names
                    .iter()
                    .map(|name| {
                        *index.entry(name.as_str()).or_insert_with(|| {
                            distinct.push(name.as_str());
                            distinct.len() - 1
                        })
                    })
                    .collect();

                if order == CategoryOrder::Sorted {
                    let mut by_name: Vec<usize> = (0..distinct.len()).collect();
                    by_name.sort_by(|&a, &b| distinct[a].cmp(distinct[b]));

                    let mut rank = vec![0; distinct.len()];
                    for (sorted_idx, &appearance_idx) in by_name.iter().enumerate() {
                        rank[appearance_idx] = sorted_idx;
                    }
                    for row in rows.iter_mut() {
                        *row = rank[*row];
                    }
                    distinct = by_name.iter().map(|&i| distinct[i]).collect();
                }

                let axis = XAxis {
                    keys: distinct
                        .iter()
                        .map(|name| XValue::Category(name.to_string()))
                        .collect(),
                    positions: (0..distinct.len()).map(|i| i as f64).collect(),
                };
                Ok((axis, rows))
            }
        }
    }

    /// Number of distinct x values
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Original x keys, in axis order
    pub fn keys(&self) -> &[XValue] {
        &self.keys
    }

    /// Numeric positions, strictly increasing
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Tick positions and labels for every distinct x
    ///
    /// Timestamps at midnight show the date only; other instants show date and time.
    pub fn ticks(&self) -> Vec<Tick> {
        self.keys
            .iter()
            .zip(&self.positions)
            .map(|(key, &position)| Tick {
                position,
                text: tick_text(key),
            })
            .collect()
    }
}

fn tick_text(key: &XValue) -> String {
    match key {
        XValue::Numeric(v) => v.to_string(),
        XValue::Category(name) => name.clone(),
        XValue::Timestamp { ticks, scale } => match scale.to_datetime(*ticks) {
            Some(dt) if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 => {
                dt.format("%Y-%m-%d").to_string()
            }
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => ticks.to_string(),
        },
    }
}
