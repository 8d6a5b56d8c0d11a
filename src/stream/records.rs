//! Output shapes for rendering collaborators
//!
//! - `BandRecord`: one row-oriented record per band row (JSON "records" layout)
//! - `BandTrace`: one filled outline per label, optionally smoothed

use super::bands::{BandRow, BandTable};
use super::error::{Result, StreamError};
use super::palettes::LabelColors;
use super::smooth::{linspace, MonotoneInterpolator, MAX_RESOLUTION};
use super::table::XValue;
use serde::{Deserialize, Serialize};

/// x as it appears in a record: a number, or text for categories and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordX {
    Number(f64),
    Text(String),
}

impl From<&XValue> for RecordX {
    fn from(x: &XValue) -> Self {
        match x {
            XValue::Numeric(v) => RecordX::Number(*v),
            other => RecordX::Text(other.to_string()),
        }
    }
}

/// Row-oriented band record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRecord {
    pub label: String,
    pub x: RecordX,
    pub value: f64,
    pub order: usize,
    pub lb: f64,
    pub ub: f64,
}

impl From<&BandRow> for BandRecord {
    fn from(row: &BandRow) -> Self {
        Self {
            label: row.label.clone(),
            x: RecordX::from(&row.x),
            value: row.value,
            order: row.order,
            lb: row.lb,
            ub: row.ub,
        }
    }
}

impl BandTable {
    /// Rows as serializable records
    pub fn records(&self) -> Vec<BandRecord> {
        self.rows().iter().map(BandRecord::from).collect()
    }

    /// Rows as a JSON array of records
    pub fn to_json_records(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records())?)
    }
}

/// Filled band of one label, ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandTrace {
    pub label: String,
    pub color: String,
    pub x: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl BandTrace {
    /// Closed outline: upper bound left to right, then lower bound right to left
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let upper = self.x.iter().copied().zip(self.upper.iter().copied());
        let lower = self
            .x
            .iter()
            .copied()
            .zip(self.lower.iter().copied())
            .rev();
        upper.chain(lower).collect()
    }
}

/// Build one trace per label, in label order
///
/// With a resolution, bounds are interpolated at that many evenly spaced
/// positions; the axis then needs at least two distinct x values and no more
/// than `resolution` of them. Labels with fewer than two x positions cannot
/// form an area and are skipped.
pub fn band_traces(
    table: &BandTable,
    colors: &LabelColors,
    resolution: Option<usize>,
    interpolator: &dyn MonotoneInterpolator,
) -> Result<Vec<BandTrace>> {
    if let Some(res) = resolution {
        let n_x = table.axis().len();
        if n_x < 2 {
            return Err(StreamError::invalid(format!(
                "smoothing needs at least two distinct x values, got {}",
                n_x
            )));
        }
        if res < n_x {
            return Err(StreamError::invalid(format!(
                "interpolation resolution {} is smaller than the number of distinct x values ({})",
                res, n_x
            )));
        }
        if res > MAX_RESOLUTION.max(n_x) {
            return Err(StreamError::invalid(format!(
                "interpolation resolution {} exceeds the limit of {}",
                res,
                MAX_RESOLUTION.max(n_x)
            )));
        }
    }

    let mut traces = Vec::with_capacity(table.labels().len());

    for (index, label) in table.labels().iter().enumerate() {
        let rows: Vec<&BandRow> = table.series(index).collect();
        if rows.len() < 2 {
            tracing::debug!(label = %label, "skipping band with fewer than two x values");
            continue;
        }

        let positions: Vec<f64> = rows.iter().map(|r| r.position).collect();
        let lower: Vec<f64> = rows.iter().map(|r| r.lb).collect();
        let upper: Vec<f64> = rows.iter().map(|r| r.ub).collect();

        let (x, lower, upper) = match resolution {
            Some(res) => {
                let at = linspace(positions[0], positions[positions.len() - 1], res);
                let smooth_lower = interpolator.interpolate(&positions, &lower, &at)?;
                let smooth_upper = interpolator.interpolate(&positions, &upper, &at)?;
                (at, smooth_lower, smooth_upper)
            }
            None => (positions, lower, upper),
        };

        traces.push(BandTrace {
            label: label.clone(),
            color: colors.get(label).unwrap_or("#808080").to_string(),
            x,
            lower,
            upper,
        });
    }

    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::bands::{stack, StackOptions};
    use crate::stream::palettes::DEFAULT_PALETTE;
    use crate::stream::smooth::Pchip;
    use crate::stream::table::{Observation, Observations};

    fn table() -> BandTable {
        let obs = Observations::from_rows(vec![
            Observation::new("lab_1", 3.0, 1.0),
            Observation::new("lab_1", 1.0, 1.0),
            Observation::new("lab_1", 2.0, 1.0),
            Observation::new("lab_2", 1.0, 3.0),
            Observation::new("lab_2", 2.0, 2.0),
            Observation::new("lab_2", 3.0, 3.0),
        ])
        .unwrap();
        stack(&obs, &StackOptions::default()).unwrap()
    }

    fn colors(table: &BandTable) -> LabelColors {
        LabelColors::resolve(table.labels(), None, DEFAULT_PALETTE).unwrap()
    }

    #[test]
    fn test_json_records_shape() {
        let json = table().to_json_records().unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.len(), 6);
        assert_eq!(
            parsed[0],
            serde_json::json!({
                "label": "lab_2", "x": 1.0, "value": 3.0, "order": 0, "lb": 0.0, "ub": 3.0
            })
        );

        let records: Vec<BandRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records, table().records());
    }

    #[test]
    fn test_text_x_in_records() {
        let obs = Observations::from_rows(vec![Observation::new("a", "mon", 1.0)]).unwrap();
        let table = stack(&obs, &StackOptions::default()).unwrap();
        assert_eq!(table.records()[0].x, RecordX::Text("mon".into()));
    }

    #[test]
    fn test_raw_traces() {
        let table = table();
        let traces = band_traces(&table, &colors(&table), None, &Pchip).unwrap();

        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].label, "lab_1");
        assert_eq!(traces[0].color, "#A6CEE3");
        assert_eq!(traces[0].x, vec![1.0, 2.0, 3.0]);
        assert_eq!(traces[0].lower, vec![3.0, 2.0, 3.0]);
        assert_eq!(traces[0].upper, vec![4.0, 3.0, 4.0]);
    }

    #[test]
    fn test_smoothed_traces() {
        let table = table();
        let traces = band_traces(&table, &colors(&table), Some(21), &Pchip).unwrap();

        let trace = &traces[1];
        assert_eq!(trace.x.len(), 21);
        assert_eq!(trace.x[0], 1.0);
        assert_eq!(trace.x[20], 3.0);
        assert!((trace.upper[10] - 2.0).abs() < 1e-12);
        assert!(trace
            .lower
            .iter()
            .zip(&trace.upper)
            .all(|(lb, ub)| lb <= ub));
    }

    #[test]
    fn test_smoothing_resolution_too_small() {
        let table = table();
        let err = band_traces(&table, &colors(&table), Some(2), &Pchip).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));

        let err = band_traces(&table, &colors(&table), Some(usize::MAX), &Pchip).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }

    #[test]
    fn test_single_x_skipped_or_rejected() {
        let obs = Observations::from_rows(vec![
            Observation::new("a", 1.0, 1.0),
            Observation::new("b", 1.0, 2.0),
        ])
        .unwrap();
        let table = stack(&obs, &StackOptions::default()).unwrap();
        let colors = colors(&table);

        assert!(band_traces(&table, &colors, None, &Pchip).unwrap().is_empty());
        assert!(band_traces(&table, &colors, Some(1000), &Pchip).is_err());
    }

    #[test]
    fn test_outline() {
        let trace = BandTrace {
            label: "a".into(),
            color: "#000000".into(),
            x: vec![0.0, 1.0],
            lower: vec![0.0, 1.0],
            upper: vec![2.0, 3.0],
        };
        assert_eq!(
            trace.outline(),
            vec![(0.0, 2.0), (1.0, 3.0), (1.0, 1.0), (0.0, 0.0)]
        );
    }
}
