//! Stream configuration from string properties
//!
//! Configuration is loaded from properties defined in stream.json. All default
//! values come from stream.json via `PropertyReader`; this module holds no
//! hardcoded fallbacks. Range checks (negative pad, too small resolution) are
//! left to the transform, which rejects them with `InvalidInput`.

use crate::stream::{CategoryOrder, ColumnNames, PropertyReader, StackOptions};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Names of the label, x and value columns
    pub columns: ColumnNames,

    /// Vertical gap between neighbouring bands
    pub pad: f64,

    /// Stack smallest values first
    pub ascending: bool,

    /// Center each x column around zero
    pub centered: bool,

    /// Per-column ordering; false selects one order per label by cumulative area
    pub time_series: bool,

    /// Ranking of categorical x values
    pub category_order: CategoryOrder,

    /// Interpolate band bounds for rendering
    pub smooth: bool,

    /// Number of interpolated points (None = automatic)
    pub interp_resolution: Option<f64>,

    /// Palette name from palettes.json
    pub palette: String,

    /// Explicit label → colour map, overrides the palette
    pub colors: Option<HashMap<String, String>>,

    /// Plot title (optional)
    pub title: Option<String>,
}

impl StreamConfig {
    /// Create config from user-set properties
    ///
    /// Unset or empty properties take their stream.json default; invalid ones
    /// are logged and replaced by the default.
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let props = PropertyReader::new(properties);

        let columns = ColumnNames::new(
            props.get_string("label.column"),
            props.get_string("x.column"),
            props.get_string("value.column"),
        );

        let title = Some(props.get_string("plot.title")).filter(|t| !t.is_empty());

        let config = Self {
            columns,
            pad: props.get_f64("pad"),
            ascending: props.get_bool("ascending"),
            centered: props.get_bool("centered"),
            time_series: props.get_bool("time.series"),
            category_order: CategoryOrder::parse(&props.get_enum("x.category.order")),
            smooth: props.get_bool("smooth"),
            interp_resolution: props.get_optional_f64("interp.resolution"),
            palette: props.get_enum("palette"),
            colors: None,
            title,
        };

        tracing::debug!(?config, "loaded stream configuration");

        config
    }

    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn pad(mut self, pad: f64) -> Self {
        self.pad = pad;
        self
    }

    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    pub fn time_series(mut self, time_series: bool) -> Self {
        self.time_series = time_series;
        self
    }

    pub fn category_order(mut self, order: CategoryOrder) -> Self {
        self.category_order = order;
        self
    }

    pub fn smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn interp_resolution(mut self, resolution: Option<f64>) -> Self {
        self.interp_resolution = resolution;
        self
    }

    pub fn palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = palette.into();
        self
    }

    pub fn colors(mut self, colors: HashMap<String, String>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parameters of the stacking transform
    pub fn stack_options(&self) -> StackOptions {
        StackOptions {
            pad: self.pad,
            ascending: self.ascending,
            centered: self.centered,
            time_series: self.time_series,
            category_order: self.category_order,
        }
    }
}

impl Default for StreamConfig {
    /// All stream.json defaults
    fn default() -> Self {
        Self::from_properties(&HashMap::new())
    }
}
