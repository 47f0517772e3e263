use ndarray::{ArrayView1, ArrayView2};

use crate::{FitStats, LinearModel, MlError};

/// A fitted model together with the statistics of the fit that produced it.
#[derive(Debug, Clone)]
pub struct Fitted {
    pub model: LinearModel,
    pub stats: FitStats,
}

/// Abstraction over a single-output regression solver.
///
/// Every call is independent: implementations must not carry state from one
/// fit into the next, so the same solver can be reused for every target
/// column of a dataset.
pub trait Regressor {
    /// Fits one target column against the feature matrix.
    ///
    /// # Args
    /// * `x` - Feature matrix, one row per sample.
    /// * `y` - Target values, one per sample.
    ///
    /// # Returns
    /// The fitted model and its training statistics.
    ///
    /// # Errors
    /// Implementations should return:
    /// - `MlError::ShapeMismatch` when `x` and `y` disagree on the sample count.
    /// - `MlError::InvalidInput` for degenerate inputs (e.g. no samples).
    /// - `MlError::RankDeficient` when the solver refuses a non-unique solution.
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Fitted, MlError>;
}
