use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::MlError;

/// Per-feature mean and scale computed once over a training set.
///
/// The value is immutable once fit; the same statistics are used to
/// transform the training matrix and are written alongside the models so
/// inference can reproduce the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardization {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl Standardization {
    /// Computes the column means and population standard deviations of `x`.
    ///
    /// A column whose variance is within rounding noise of zero, relative to
    /// its mean and the sample count, gets a scale of `1.0`, so transforming
    /// it only centres the values.
    ///
    /// # Errors
    /// Returns `MlError::InvalidInput` if `x` has no rows, or
    /// `MlError::NonFinite` if any statistic is not finite.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, MlError> {
        let means = x
            .mean_axis(Axis(0))
            .ok_or(MlError::InvalidInput("cannot standardize an empty matrix"))?;
        let stds = x.std_axis(Axis(0), 0.0);

        let scales: Array1<f64> = means
            .iter()
            .zip(&stds)
            .enumerate()
            .map(|(j, (&mean, &std))| {
                if is_constant(mean, std, x.nrows()) {
                    warn!("feature {j} is constant (mean {mean}), leaving it unscaled");
                    1.0
                } else {
                    std
                }
            })
            .collect();

        if means.iter().chain(&scales).any(|v| !v.is_finite()) {
            return Err(MlError::NonFinite("standardization statistics"));
        }

        debug!("feature means: {means}");
        debug!("feature scales: {scales}");

        Ok(Self { means, scales })
    }

    /// Rebuilds statistics that were computed elsewhere (e.g. read back from
    /// a parameter file).
    ///
    /// # Errors
    /// Returns `MlError::ShapeMismatch` if the vectors differ in length and
    /// `MlError::InvalidInput` if any scale is not strictly positive.
    pub fn from_parts(means: Array1<f64>, scales: Array1<f64>) -> Result<Self, MlError> {
        if means.len() != scales.len() {
            return Err(MlError::ShapeMismatch {
                what: "scales",
                got: scales.len(),
                expected: means.len(),
            });
        }
        if means.iter().any(|m| !m.is_finite()) {
            return Err(MlError::NonFinite("feature means"));
        }
        if scales.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(MlError::InvalidInput("scales must be finite and positive"));
        }

        Ok(Self { means, scales })
    }

    #[inline]
    pub fn means(&self) -> ArrayView1<'_, f64> {
        self.means.view()
    }

    /// Per-feature divisor; the population standard deviation, or `1.0`
    /// for constant columns.
    #[inline]
    pub fn scales(&self) -> ArrayView1<'_, f64> {
        self.scales.view()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.means.len()
    }

    /// Maps raw features to `(x - mean) / scale`.
    ///
    /// # Errors
    /// Returns `MlError::ShapeMismatch` if `x` has the wrong number of columns.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, MlError> {
        self.check(x.ncols())?;
        Ok((&x - &self.means) / &self.scales)
    }

    /// Maps standardized features back to `x * scale + mean`.
    ///
    /// # Errors
    /// Returns `MlError::ShapeMismatch` if `x` has the wrong number of columns.
    pub fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, MlError> {
        self.check(x.ncols())?;
        Ok(&x * &self.scales + &self.means)
    }

    /// Single-row variant of [`Standardization::transform`].
    pub fn transform_one(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, MlError> {
        self.check(x.len())?;
        Ok((&x - &self.means) / &self.scales)
    }

    fn check(&self, ncols: usize) -> Result<(), MlError> {
        if ncols != self.num_features() {
            return Err(MlError::ShapeMismatch {
                what: "features",
                got: ncols,
                expected: self.num_features(),
            });
        }

        Ok(())
    }
}

/// A feature is constant when its variance is within the rounding error of
/// a two-pass variance computation over `n` samples.
fn is_constant(mean: f64, std: f64, n: usize) -> bool {
    let n = n as f64;
    let var = std * std;
    let bound = n * f64::EPSILON * var + (n * mean * f64::EPSILON).powi(2);
    var <= bound
}

/// How the selected feature columns are prepared before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessor {
    /// Features are fit as read.
    Identity,
    /// Features are standardized to zero mean and unit variance.
    Standardize,
}

/// The matrix handed to the fitter, plus the statistics used to produce it.
#[derive(Debug, Clone)]
pub struct Features {
    pub matrix: Array2<f64>,
    pub standardization: Option<Standardization>,
}

impl Preprocessor {
    /// Prepares the raw feature matrix for fitting.
    ///
    /// # Args
    /// * `raw` - The selected feature columns, one row per sample.
    ///
    /// # Returns
    /// The prepared features. Statistics are only present for
    /// `Preprocessor::Standardize`.
    pub fn prepare(self, raw: Array2<f64>) -> Result<Features, MlError> {
        match self {
            Preprocessor::Identity => Ok(Features {
                matrix: raw,
                standardization: None,
            }),
            Preprocessor::Standardize => {
                let stats = Standardization::fit(raw.view())?;
                let matrix = stats.transform(raw.view())?;
                Ok(Features {
                    matrix,
                    standardization: Some(stats),
                })
            }
        }
    }
}
