// Reads Criterion output into per-function sample series.
pub mod report;
// Declared growth kind of every function.
pub mod registry;
pub mod growth_kind;
// Decides once per function whether and how it is priced.
pub mod dispatch;
mod least_squares;
// Fits coefficients against the growth transform of a function.
pub mod estimator;
pub mod cost_table;
// Converts nanoseconds into protocol cost units and applies the floors.
pub mod scaling;
// Makes interchangeable functions share one conservative cost.
pub mod matched_group;
// Fixed-shape formulas of the storage-touching functions.
pub mod special_case;
pub mod formula;
pub mod synthesizer;
// Writes the formula document and the comparison table.
pub mod emitter;
pub mod pipeline;
pub mod config;
pub mod error;

pub use config::CalibrationConfig;
pub use error::{CalibrationError, ConfigError};
