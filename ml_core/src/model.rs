use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::MlError;

/// A fitted linear model: `y = w·x + b`.
///
/// The weights are stored in the column order the model was fit with.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Creates a new `LinearModel`.
    ///
    /// # Args
    /// * `weights` - One weight per input feature.
    /// * `intercept` - The bias term.
    ///
    /// # Errors
    /// Returns `MlError::NonFinite` if any coefficient is `NaN` or infinite.
    pub fn new(weights: Array1<f64>, intercept: f64) -> Result<Self, MlError> {
        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(MlError::NonFinite("model coefficients"));
        }

        Ok(Self { weights, intercept })
    }

    #[inline]
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of input features the model expects.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.weights.len()
    }

    /// Evaluates the model on a single feature vector.
    ///
    /// # Errors
    /// Returns `MlError::ShapeMismatch` if `x` has the wrong length.
    pub fn predict_one(&self, x: ArrayView1<f64>) -> Result<f64, MlError> {
        if x.len() != self.num_features() {
            return Err(MlError::ShapeMismatch {
                what: "features",
                got: x.len(),
                expected: self.num_features(),
            });
        }

        Ok(self.weights.dot(&x) + self.intercept)
    }

    /// Evaluates the model on every row of `x`.
    ///
    /// # Errors
    /// Returns `MlError::ShapeMismatch` if `x` has the wrong number of columns.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, MlError> {
        if x.ncols() != self.num_features() {
            return Err(MlError::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: self.num_features(),
            });
        }

        Ok(x.dot(&self.weights) + self.intercept)
    }
}
