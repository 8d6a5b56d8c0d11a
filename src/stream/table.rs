//! Typed input schema for the stacking transform
//!
//! Observations are held column-oriented: one label column, one x column with an
//! explicit variant tag, and one value column. Everything is validated at the
//! boundary so the rest of the transform works on clean data.

use super::error::{Result, StreamError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Resolution of the integer ticks backing a timestamp x column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeScale {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    /// Calendar days since the Unix epoch (date columns)
    Days,
}

impl TimeScale {
    /// Convert a tick count to seconds
    pub fn seconds(self, ticks: i64) -> f64 {
        match self {
            TimeScale::Nanoseconds => ticks as f64 / 1e9,
            TimeScale::Microseconds => ticks as f64 / 1e6,
            TimeScale::Milliseconds => ticks as f64 / 1e3,
            TimeScale::Days => ticks as f64 * 86_400.0,
        }
    }

    /// Convert a tick count to a UTC instant (None if out of chrono's range)
    pub fn to_datetime(self, ticks: i64) -> Option<DateTime<Utc>> {
        let (per_second, nanos_per_tick): (i64, i64) = match self {
            TimeScale::Nanoseconds => (1_000_000_000, 1),
            TimeScale::Microseconds => (1_000_000, 1_000),
            TimeScale::Milliseconds => (1_000, 1_000_000),
            TimeScale::Days => {
                return DateTime::from_timestamp(ticks.checked_mul(86_400)?, 0);
            }
        };
        let secs = ticks.div_euclid(per_second);
        let nanos = ticks.rem_euclid(per_second) * nanos_per_tick;
        DateTime::from_timestamp(secs, nanos as u32)
    }
}

/// A single x-key value
#[derive(Debug, Clone, PartialEq)]
pub enum XValue {
    Numeric(f64),
    Timestamp { ticks: i64, scale: TimeScale },
    Category(String),
}

impl XValue {
    /// Human-readable kind name, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            XValue::Numeric(_) => "numeric",
            XValue::Timestamp { .. } => "timestamp",
            XValue::Category(_) => "categorical",
        }
    }
}

impl std::fmt::Display for XValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XValue::Numeric(v) => write!(f, "{}", v),
            XValue::Timestamp { ticks, scale } => match scale.to_datetime(*ticks) {
                Some(dt) => write!(f, "{}", dt.to_rfc3339()),
                None => write!(f, "{} ({:?})", ticks, scale),
            },
            XValue::Category(s) => f.write_str(s),
        }
    }
}

impl From<f64> for XValue {
    fn from(v: f64) -> Self {
        XValue::Numeric(v)
    }
}

impl From<i64> for XValue {
    fn from(v: i64) -> Self {
        XValue::Numeric(v as f64)
    }
}

impl From<i32> for XValue {
    fn from(v: i32) -> Self {
        XValue::Numeric(v as f64)
    }
}

impl From<&str> for XValue {
    fn from(v: &str) -> Self {
        XValue::Category(v.to_string())
    }
}

impl From<String> for XValue {
    fn from(v: String) -> Self {
        XValue::Category(v)
    }
}

impl From<bool> for XValue {
    fn from(v: bool) -> Self {
        XValue::Category(v.to_string())
    }
}

impl From<NaiveDate> for XValue {
    fn from(d: NaiveDate) -> Self {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        XValue::Timestamp {
            ticks: (d - epoch).num_days(),
            scale: TimeScale::Days,
        }
    }
}

impl From<NaiveDateTime> for XValue {
    fn from(dt: NaiveDateTime) -> Self {
        XValue::Timestamp {
            ticks: dt.and_utc().timestamp_micros(),
            scale: TimeScale::Microseconds,
        }
    }
}

/// The x column, tagged with its kind
#[derive(Debug, Clone, PartialEq)]
pub enum XColumn {
    Numeric(Vec<f64>),
    Timestamp { ticks: Vec<i64>, scale: TimeScale },
    Categorical(Vec<String>),
}

impl XColumn {
    pub fn len(&self) -> usize {
        match self {
            XColumn::Numeric(v) => v.len(),
            XColumn::Timestamp { ticks, .. } => ticks.len(),
            XColumn::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the x value at a row
    pub fn get(&self, row: usize) -> Option<XValue> {
        match self {
            XColumn::Numeric(v) => v.get(row).map(|x| XValue::Numeric(*x)),
            XColumn::Timestamp { ticks, scale } => ticks.get(row).map(|t| XValue::Timestamp {
                ticks: *t,
                scale: *scale,
            }),
            XColumn::Categorical(v) => v.get(row).map(|s| XValue::Category(s.clone())),
        }
    }
}

/// Names of the three input columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub label: String,
    pub x: String,
    pub value: String,
}

impl ColumnNames {
    pub fn new(label: impl Into<String>, x: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            x: x.into(),
            value: value.into(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::new("label", "x", "value")
    }
}

/// One row of input
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: String,
    pub x: XValue,
    /// Missing values count as zero height
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(label: impl Into<String>, x: impl Into<XValue>, value: f64) -> Self {
        Self {
            label: label.into(),
            x: x.into(),
            value: Some(value),
        }
    }

    /// Observation with no recorded value
    pub fn missing(label: impl Into<String>, x: impl Into<XValue>) -> Self {
        Self {
            label: label.into(),
            x: x.into(),
            value: None,
        }
    }
}

/// Validated long-format input table
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    labels: Vec<String>,
    x: XColumn,
    values: Vec<Option<f64>>,
}

impl Observations {
    /// Build from columns, validating shape and values
    ///
    /// Numeric x must be finite; values must be finite and non-negative when
    /// present. Negative zero is normalized so that it groups with zero.
    pub fn new(labels: Vec<String>, x: XColumn, values: Vec<Option<f64>>) -> Result<Self> {
        if labels.len() != x.len() || labels.len() != values.len() {
            return Err(StreamError::invalid(format!(
                "column lengths differ: {} labels, {} x values, {} values",
                labels.len(),
                x.len(),
                values.len()
            )));
        }

        let x = match x {
            XColumn::Numeric(xs) => {
                if let Some(row) = xs.iter().position(|v| !v.is_finite()) {
                    return Err(StreamError::invalid(format!(
                        "x must be finite, got {} at row {}",
                        xs[row], row
                    )));
                }
                XColumn::Numeric(xs.into_iter().map(|v| v + 0.0).collect())
            }
            other => other,
        };

        let mut checked = Vec::with_capacity(values.len());
        for (row, value) in values.into_iter().enumerate() {
            match value {
                Some(v) if !v.is_finite() => {
                    return Err(StreamError::invalid(format!(
                        "value must be finite, got {} at row {}",
                        v, row
                    )));
                }
                Some(v) if v < 0.0 => {
                    return Err(StreamError::invalid(format!(
                        "all values must be non-negative, got {} at row {}",
                        v, row
                    )));
                }
                Some(v) => checked.push(Some(v + 0.0)),
                None => checked.push(None),
            }
        }

        Ok(Self {
            labels,
            x,
            values: checked,
        })
    }

    /// Build from row-oriented observations
    ///
    /// All rows must share one x kind (and one time scale for timestamps).
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Observation>,
    {
        let rows: Vec<Observation> = rows.into_iter().collect();
        let mut labels = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());

        let mut x = match rows.first().map(|r| &r.x) {
            None => XColumn::Numeric(Vec::new()),
            Some(XValue::Numeric(_)) => XColumn::Numeric(Vec::with_capacity(rows.len())),
            Some(XValue::Timestamp { scale, .. }) => XColumn::Timestamp {
                ticks: Vec::with_capacity(rows.len()),
                scale: *scale,
            },
            Some(XValue::Category(_)) => XColumn::Categorical(Vec::with_capacity(rows.len())),
        };

        for (row, obs) in rows.into_iter().enumerate() {
            match (&mut x, obs.x) {
                (XColumn::Numeric(xs), XValue::Numeric(v)) => xs.push(v),
                (XColumn::Timestamp { ticks, scale }, XValue::Timestamp { ticks: t, scale: s })
                    if *scale == s =>
                {
                    ticks.push(t)
                }
                (XColumn::Categorical(xs), XValue::Category(c)) => xs.push(c),
                (column, other) => {
                    let expected = column.get(0).map(|v| v.kind_name()).unwrap_or("unknown");
                    return Err(StreamError::invalid(format!(
                        "mixed x types: row {} has {} x '{}', expected {}",
                        row,
                        other.kind_name(),
                        other,
                        expected
                    )));
                }
            }
            labels.push(obs.label);
            values.push(obs.value);
        }

        Self::new(labels, x, values)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn x(&self) -> &XColumn {
        &self.x
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}
