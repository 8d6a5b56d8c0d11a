//! Sorted streamgraph stacking
//!
//! This module provides:
//! - Typed observation tables and polars conversion
//! - Grid completion, stacking order and padded cumulative bands
//! - Monotone smoothing, palettes and render-ready traces

pub mod axis;
pub mod bands;
pub mod error;
pub mod frame;
pub mod grid;
pub mod order;
pub mod palettes;
pub mod properties;
pub mod records;
pub mod smooth;
pub mod table;

pub use axis::{CategoryOrder, Tick, XAxis};
pub use bands::{stack, BandRow, BandTable, StackOptions};
pub use error::{Result, StreamError};
pub use frame::{LB_COLUMN, ORDER_COLUMN, UB_COLUMN};
pub use grid::CompletedGrid;
pub use order::{CumulativeAreaOrder, StackDirection, StackOrder, TimeSeriesOrder};
pub use palettes::{LabelColors, DEFAULT_PALETTE};
pub use properties::PropertyReader;
pub use records::{band_traces, BandRecord, BandTrace, RecordX};
pub use smooth::{MonotoneInterpolator, Pchip};
pub use table::{ColumnNames, Observation, Observations, TimeScale, XColumn, XValue};
