//! Fits the linear motion models and writes `model_params.txt`.
//!
//! The pipeline is strictly linear: [`load_samples`] reads the headerless
//! sample file, the [`ColumnLayout`] selects and optionally standardizes the
//! features, one least-squares model is fit per target, and
//! [`ModelParams::save`] atomically writes the result.

pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod params;
pub mod pipeline;

pub use config::TrainConfig;
pub use error::{Result, RowFault, TrainErr};
pub use layout::{ColumnLayout, ColumnSpec, Variant};
pub use loader::{load_samples, read_samples};
pub use params::ModelParams;
pub use pipeline::{run, train, RunSummary, TargetReport};
