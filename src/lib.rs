//! Sorted streamgraph library
//!
//! Stacks long-format (label, x, value) tables into streamgraph bands whose
//! vertical order is recomputed at every x, with stable tie-breaking against
//! the previous x. Output is an augmented table (`order`, `lb`, `ub`) plus
//! optional smoothed, coloured traces for rendering.

pub mod config;
pub mod pipeline;
pub mod stream;

pub use config::StreamConfig;
pub use pipeline::{prepare_plot, stack_frame, stack_to_frame, StreamPlot};
pub use stream::{stack, BandRow, BandTable, Observation, Observations, StackOptions, StreamError};
