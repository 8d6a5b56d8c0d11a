//! Shared stacking pipeline
//!
//! Entry points from a long-format polars DataFrame:
//! 1. Read typed observations using the configured column names
//! 2. Stack them into bands
//! 3. Either write the augmented table back as a DataFrame, or assemble
//!    everything a renderer needs (traces, colours, ticks, titles)

use crate::config::StreamConfig;
use crate::stream::smooth::resolve_resolution;
use crate::stream::{
    band_traces, stack, BandTable, BandTrace, LabelColors, Observations, Pchip, Result, Tick,
};
use polars::prelude::DataFrame;

/// Stack the observations of a DataFrame
pub fn stack_frame(df: &DataFrame, config: &StreamConfig) -> Result<BandTable> {
    let observations = Observations::from_dataframe(df, &config.columns)?;
    stack(&observations, &config.stack_options())
}

/// Stack a DataFrame and return it augmented with `order`, `lb` and `ub`
///
/// Rows come back sorted by x, then by stacking order, with every missing
/// (label, x) pair filled in with a zero value.
pub fn stack_to_frame(df: &DataFrame, config: &StreamConfig) -> Result<DataFrame> {
    stack_frame(df, config)?.to_dataframe(&config.columns)
}

/// Everything needed to draw a streamgraph
#[derive(Debug, Clone)]
pub struct StreamPlot {
    pub table: BandTable,
    /// One filled band per label, in label order
    pub traces: Vec<BandTrace>,
    pub ticks: Vec<Tick>,
    pub title: Option<String>,
    pub x_title: String,
    pub y_title: String,
}

/// Stack a DataFrame and build render-ready traces
pub fn prepare_plot(df: &DataFrame, config: &StreamConfig) -> Result<StreamPlot> {
    let table = stack_frame(df, config)?;

    let colors = LabelColors::resolve(table.labels(), config.colors.as_ref(), &config.palette)?;

    let resolution = if config.smooth {
        Some(resolve_resolution(
            table.axis().len(),
            config.interp_resolution,
        )?)
    } else {
        None
    };

    let traces = band_traces(&table, &colors, resolution, &Pchip)?;
    let ticks = table.axis().ticks();

    tracing::debug!(
        labels = table.labels().len(),
        traces = traces.len(),
        ticks = ticks.len(),
        resolution = ?resolution,
        "prepared stream plot"
    );

    Ok(StreamPlot {
        table,
        traces,
        ticks,
        title: config.title.clone(),
        x_title: config.columns.x.clone(),
        y_title: config.columns.value.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{ColumnNames, StreamError};
    use polars::prelude::*;
    use std::collections::HashMap;

    fn example_df() -> DataFrame {
        df!(
            "label" => ["a", "a", "a", "a", "b", "b", "b", "b"],
            "x" => [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0],
            "value" => [3.0, 3.0, 1.0, 3.0, 2.0, 2.0, 2.0, 2.0]
        )
        .unwrap()
    }

    #[test]
    fn test_stack_to_frame() {
        let out = stack_to_frame(&example_df(), &StreamConfig::default()).unwrap();
        assert_eq!(out.height(), 8);

        let labels: Vec<Option<&str>> = out
            .column("label")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            labels,
            vec![
                Some("a"),
                Some("b"),
                Some("a"),
                Some("b"),
                Some("b"),
                Some("a"),
                Some("a"),
                Some("b")
            ]
        );

        let ub: Vec<Option<f64>> = out
            .column("ub")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ub[..2], [Some(3.0), Some(5.0)]);
    }

    #[test]
    fn test_custom_column_names() {
        let df = df!(
            "fruit" => ["apple", "pear"],
            "day" => ["mon", "mon"],
            "sold" => [4.0, 6.0]
        )
        .unwrap();
        let config = StreamConfig::default().columns(ColumnNames::new("fruit", "day", "sold"));

        let table = stack_frame(&df, &config).unwrap();
        assert_eq!(table.column(0)[0].label, "pear");

        let err = stack_frame(&df, &StreamConfig::default()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_pad_from_properties() {
        let mut properties = HashMap::new();
        properties.insert("pad".to_string(), "-1".to_string());
        let config = StreamConfig::from_properties(&properties);

        let err = stack_frame(&example_df(), &config).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }

    #[test]
    fn test_prepare_smoothed_plot() {
        let config = StreamConfig::default().title("Example");
        let plot = prepare_plot(&example_df(), &config).unwrap();

        assert_eq!(plot.traces.len(), 2);
        assert!(plot.traces.iter().all(|t| t.x.len() == 1000));
        assert_eq!(plot.traces[0].color, "#A6CEE3");
        assert_eq!(plot.ticks.len(), 4);
        assert_eq!(plot.ticks[0].text, "1");
        assert_eq!(plot.title.as_deref(), Some("Example"));
        assert_eq!(plot.x_title, "x");
        assert_eq!(plot.y_title, "value");
    }

    #[test]
    fn test_prepare_raw_plot_with_custom_colors() {
        let mut colors = HashMap::new();
        colors.insert("a".to_string(), "#000000".to_string());
        colors.insert("b".to_string(), "#FFFFFF".to_string());
        let config = StreamConfig::default().smooth(false).colors(colors);

        let plot = prepare_plot(&example_df(), &config).unwrap();
        assert_eq!(plot.traces[1].color, "#FFFFFF");
        assert_eq!(plot.traces[1].x, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_huge_resolution_rejected() {
        let mut properties = HashMap::new();
        properties.insert("interp.resolution".to_string(), "1e30".to_string());
        let config = StreamConfig::from_properties(&properties);

        let err = prepare_plot(&example_df(), &config).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }

    #[test]
    fn test_resolution_below_distinct_x_rejected() {
        let config = StreamConfig::default().interp_resolution(Some(3.0));
        let err = prepare_plot(&example_df(), &config).unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
    }
}
