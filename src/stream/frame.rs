//! Polars DataFrame conversion
//!
//! Converts a long-format DataFrame into typed `Observations`, and a
//! `BandTable` back into a DataFrame augmented with `order`, `lb` and `ub`.
//!
//! x dtype mapping:
//! - integer / float → numeric
//! - Datetime(unit) → timestamp with that unit; Date → timestamp in days
//! - String / Categorical / Enum / Boolean → categorical

use super::bands::{BandRow, BandTable};
use super::error::{Result, StreamError};
use super::table::{ColumnNames, Observations, TimeScale, XColumn, XValue};
use polars::prelude::*;

/// Names of the columns added by the transform
pub const ORDER_COLUMN: &str = "order";
pub const LB_COLUMN: &str = "lb";
pub const UB_COLUMN: &str = "ub";

impl Observations {
    /// Read observations from a DataFrame with the given column names
    pub fn from_dataframe(df: &DataFrame, names: &ColumnNames) -> Result<Self> {
        let labels = read_labels(column(df, &names.label)?, &names.label)?;
        let x = read_x(column(df, &names.x)?, &names.x)?;
        let values = read_values(column(df, &names.value)?, &names.value)?;

        tracing::debug!(
            rows = df.height(),
            label = %names.label,
            x = %names.x,
            value = %names.value,
            "read observations from DataFrame"
        );

        Observations::new(labels, x, values)
    }
}

impl BandTable {
    /// Augmented DataFrame: input columns (caller's names) plus order, lb, ub
    ///
    /// Timestamp x is cast back to Datetime/Date; categorical x becomes String.
    pub fn to_dataframe(&self, names: &ColumnNames) -> Result<DataFrame> {
        let wanted = [
            names.label.as_str(),
            names.x.as_str(),
            names.value.as_str(),
            ORDER_COLUMN,
            LB_COLUMN,
            UB_COLUMN,
        ];
        for (i, name) in wanted.iter().enumerate() {
            if wanted[..i].contains(name) {
                return Err(StreamError::invalid(format!(
                    "output column name '{}' is used twice",
                    name
                )));
            }
        }

        let rows = self.rows();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        let orders: Vec<u32> = rows.iter().map(|r| r.order as u32).collect();
        let lbs: Vec<f64> = rows.iter().map(|r| r.lb).collect();
        let ubs: Vec<f64> = rows.iter().map(|r| r.ub).collect();

        let df = DataFrame::new(vec![
            Column::new(names.label.as_str().into(), labels),
            x_series(&names.x, rows)?.into_column(),
            Column::new(names.value.as_str().into(), values),
            Column::new(ORDER_COLUMN.into(), orders),
            Column::new(LB_COLUMN.into(), lbs),
            Column::new(UB_COLUMN.into(), ubs),
        ])?;

        Ok(df)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| {
            StreamError::invalid(format!(
                "missing column '{}' (available: {:?})",
                name,
                df.get_column_names()
            ))
        })
}

fn cast(series: &Series, dtype: &DataType, name: &str) -> Result<Series> {
    series.cast(dtype).map_err(|e| {
        StreamError::invalid(format!(
            "column '{}' of type {} cannot be read as {}: {}",
            name,
            series.dtype(),
            dtype,
            e
        ))
    })
}

fn null_error(name: &str, row: usize) -> StreamError {
    StreamError::invalid(format!("column '{}' has a null at row {}", name, row))
}

fn read_labels(series: &Series, name: &str) -> Result<Vec<String>> {
    let strings = cast(series, &DataType::String, name)?;
    let ca = strings
        .str()
        .map_err(|e| StreamError::invalid(format!("column '{}': {}", name, e)))?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| v.map(str::to_string).ok_or_else(|| null_error(name, row)))
        .collect()
}

fn read_x(series: &Series, name: &str) -> Result<XColumn> {
    match series.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => {
            let floats = cast(series, &DataType::Float64, name)?;
            let ca = floats
                .f64()
                .map_err(|e| StreamError::invalid(format!("column '{}': {}", name, e)))?;
            let xs = ca
                .into_iter()
                .enumerate()
                .map(|(row, v)| v.ok_or_else(|| null_error(name, row)))
                .collect::<Result<Vec<f64>>>()?;
            Ok(XColumn::Numeric(xs))
        }
        DataType::Datetime(unit, _) => {
            let scale = match unit {
                TimeUnit::Nanoseconds => TimeScale::Nanoseconds,
                TimeUnit::Microseconds => TimeScale::Microseconds,
                TimeUnit::Milliseconds => TimeScale::Milliseconds,
            };
            let ints = cast(series, &DataType::Int64, name)?;
            Ok(XColumn::Timestamp {
                ticks: read_ticks(&ints, name)?,
                scale,
            })
        }
        DataType::Date => {
            let ints = cast(series, &DataType::Int64, name)?;
            Ok(XColumn::Timestamp {
                ticks: read_ticks(&ints, name)?,
                scale: TimeScale::Days,
            })
        }
        DataType::Boolean => {
            let ca = series
                .bool()
                .map_err(|e| StreamError::invalid(format!("column '{}': {}", name, e)))?;
            let xs = ca
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.map(|b| b.to_string())
                        .ok_or_else(|| null_error(name, row))
                })
                .collect::<Result<Vec<String>>>()?;
            Ok(XColumn::Categorical(xs))
        }
        DataType::String | DataType::Categorical(..) | DataType::Enum(..) => {
            Ok(XColumn::Categorical(read_labels(series, name)?))
        }
        other => Err(StreamError::invalid(format!(
            "x must be numeric, datetime, categorical, or boolean; column '{}' is {}",
            name, other
        ))),
    }
}

fn read_ticks(ints: &Series, name: &str) -> Result<Vec<i64>> {
    let ca = ints
        .i64()
        .map_err(|e| StreamError::invalid(format!("column '{}': {}", name, e)))?;
    ca.into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| null_error(name, row)))
        .collect()
}

fn read_values(series: &Series, name: &str) -> Result<Vec<Option<f64>>> {
    let numeric = matches!(
        series.dtype(),
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Null
    );
    if !numeric {
        return Err(StreamError::invalid(format!(
            "value column '{}' must be numeric, got {}",
            name,
            series.dtype()
        )));
    }

    let floats = cast(series, &DataType::Float64, name)?;
    let ca = floats
        .f64()
        .map_err(|e| StreamError::invalid(format!("column '{}': {}", name, e)))?;
    Ok(ca.into_iter().collect())
}

fn x_series(name: &str, rows: &[BandRow]) -> Result<Series> {
    let series = match rows.first().map(|r| &r.x) {
        None | Some(XValue::Numeric(_)) => {
            let xs: Vec<f64> = rows
                .iter()
                .filter_map(|r| match r.x {
                    XValue::Numeric(v) => Some(v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), xs)
        }
        Some(XValue::Category(_)) => {
            let xs: Vec<&str> = rows
                .iter()
                .filter_map(|r| match &r.x {
                    XValue::Category(c) => Some(c.as_str()),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), xs)
        }
        Some(XValue::Timestamp { scale, .. }) => {
            let ticks: Vec<i64> = rows
                .iter()
                .filter_map(|r| match r.x {
                    XValue::Timestamp { ticks, .. } => Some(ticks),
                    _ => None,
                })
                .collect();
            let unit = match scale {
                TimeScale::Nanoseconds => TimeUnit::Nanoseconds,
                TimeScale::Microseconds => TimeUnit::Microseconds,
                TimeScale::Milliseconds => TimeUnit::Milliseconds,
                TimeScale::Days => {
                    let days: Vec<i32> = ticks.iter().map(|&t| t as i32).collect();
                    let dates = Series::new(name.into(), days).cast(&DataType::Date)?;
                    return checked_len(dates, rows, name);
                }
            };
            Series::new(name.into(), ticks).cast(&DataType::Datetime(unit, None))?
        }
    };

    checked_len(series, rows, name)
}

fn checked_len(series: Series, rows: &[BandRow], name: &str) -> Result<Series> {
    if series.len() != rows.len() {
        return Err(StreamError::invalid(format!(
            "x column '{}' mixes value kinds",
            name
        )));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::bands::{stack, StackOptions};

    #[test]
    fn test_read_numeric_frame() {
        let df = df! {
            "label" => ["a", "a", "b"],
            "x" => [1i64, 2, 1],
            "value" => [Some(1.5), None, Some(2.0)]
        }
        .unwrap();

        let obs = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap();
        assert_eq!(obs.labels(), &["a", "a", "b"]);
        assert_eq!(obs.x(), &XColumn::Numeric(vec![1.0, 2.0, 1.0]));
        assert_eq!(obs.values(), &[Some(1.5), None, Some(2.0)]);
    }

    #[test]
    fn test_custom_column_names() {
        let df = df! {
            "species" => ["a", "b"],
            "year" => ["2020", "2021"],
            "height" => [1.0, 2.0]
        }
        .unwrap();

        let names = ColumnNames::new("species", "year", "height");
        let obs = Observations::from_dataframe(&df, &names).unwrap();
        assert_eq!(
            obs.x(),
            &XColumn::Categorical(vec!["2020".into(), "2021".into()])
        );
    }

    #[test]
    fn test_missing_column() {
        let df = df! {
            "label" => ["a"],
            "x" => [1.0]
        }
        .unwrap();

        let err = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
        assert!(err.to_string().contains("missing column 'value'"));
    }

    #[test]
    fn test_boolean_x_is_categorical() {
        let df = df! {
            "label" => ["a", "a"],
            "x" => [true, false],
            "value" => [1.0, 2.0]
        }
        .unwrap();

        let obs = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap();
        assert_eq!(
            obs.x(),
            &XColumn::Categorical(vec!["true".into(), "false".into()])
        );
    }

    #[test]
    fn test_negative_value_rejected() {
        let df = df! {
            "label" => ["a", "b"],
            "x" => [1.0, 1.0],
            "value" => [1.0, -2.0]
        }
        .unwrap();

        let err = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }

    #[test]
    fn test_string_value_rejected() {
        let df = df! {
            "label" => ["a"],
            "x" => [1.0],
            "value" => ["tall"]
        }
        .unwrap();

        let err = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn test_null_x_rejected() {
        let df = df! {
            "label" => ["a", "b"],
            "x" => [Some(1.0), None],
            "value" => [1.0, 2.0]
        }
        .unwrap();

        let err = Observations::from_dataframe(&df, &ColumnNames::default()).unwrap_err();
        assert!(err.to_string().contains("null at row 1"));
    }

    #[test]
    fn test_datetime_round_trip() {
        let x = Series::new("when".into(), vec![0i64, 86_400_000, 0, 86_400_000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![
            Column::new("label".into(), ["a", "a", "b", "b"]),
            x.into_column(),
            Column::new("value".into(), [1.0, 2.0, 3.0, 1.0]),
        ])
        .unwrap();

        let names = ColumnNames::new("label", "when", "value");
        let obs = Observations::from_dataframe(&df, &names).unwrap();
        assert_eq!(
            obs.x(),
            &XColumn::Timestamp {
                ticks: vec![0, 86_400_000, 0, 86_400_000],
                scale: TimeScale::Milliseconds
            }
        );

        let table = stack(&obs, &StackOptions::default()).unwrap();
        assert_eq!(table.axis().positions(), &[0.0, 86_400.0]);

        let out = table.to_dataframe(&names).unwrap();
        assert_eq!(
            out.column("when").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }

    #[test]
    fn test_band_table_to_dataframe() {
        let df = df! {
            "label" => ["a", "a", "a", "a", "b", "b", "b", "b"],
            "x" => [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0],
            "value" => [3.0, 3.0, 1.0, 3.0, 2.0, 2.0, 2.0, 2.0]
        }
        .unwrap();

        let names = ColumnNames::default();
        let obs = Observations::from_dataframe(&df, &names).unwrap();
        let table = stack(&obs, &StackOptions::default()).unwrap();
        let out = table.to_dataframe(&names).unwrap();

        assert_eq!(out.height(), 8);
        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            vec!["label", "x", "value", "order", "lb", "ub"]
        );

        let orders: Vec<Option<u32>> = out
            .column("order")
            .unwrap()
            .as_materialized_series()
            .u32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            orders,
            vec![Some(0), Some(1), Some(0), Some(1), Some(0), Some(1), Some(0), Some(1)]
        );
        let labels: Vec<Option<&str>> = out
            .column("label")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels[4], Some("b"));
    }

    #[test]
    fn test_output_name_collision() {
        let obs = Observations::from_rows(Vec::new()).unwrap();
        let table = stack(&obs, &StackOptions::default()).unwrap();
        let err = table
            .to_dataframe(&ColumnNames::new("label", "x", "order"))
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }
}
