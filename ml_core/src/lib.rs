mod data;
mod error;
mod model;
mod ols;
mod preprocess;
mod stats;
mod strategy;

pub use data::{DataError, SampleTable};
pub use error::MlError;
pub use model::LinearModel;
pub use ols::{LeastSquares, RankPolicy};
pub use preprocess::{Features, Preprocessor, Standardization};
pub use stats::FitStats;
pub use strategy::{Fitted, Regressor};
