use ndarray::ArrayView1;

/// Training-set statistics produced by a single least-squares fit.
///
/// This type keeps fields private to allow evolving the internal counters
/// without breaking the public API.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitStats {
    samples: usize,
    rank: usize,
    r2: f64,
    rmse: f64,
}

impl FitStats {
    /// Creates a new `FitStats`.
    ///
    /// # Args
    /// * `samples` - Number of samples the model was fit on.
    /// * `rank` - Numerical rank of the centred feature matrix.
    /// * `r2` - Coefficient of determination on the training set.
    /// * `rmse` - Root mean squared residual on the training set.
    ///
    /// # Returns
    /// A `FitStats` instance containing the provided values.
    pub fn new(samples: usize, rank: usize, r2: f64, rmse: f64) -> Self {
        Self {
            samples,
            rank,
            r2,
            rmse,
        }
    }

    /// Computes the residual statistics of `y_pred` against `y`.
    ///
    /// # Args
    /// * `y` - Observed targets.
    /// * `y_pred` - Model predictions for the same samples.
    /// * `rank` - Numerical rank reported by the solver.
    ///
    /// # Returns
    /// The statistics. A constant target scores an R² of 1 when it is
    /// predicted exactly and 0 otherwise.
    ///
    /// # Panics
    /// Panics if `y` and `y_pred` have different lengths.
    pub fn from_residuals(y: ArrayView1<f64>, y_pred: ArrayView1<f64>, rank: usize) -> Self {
        assert_eq!(y.len(), y_pred.len(), "y and y_pred must have same length");

        let n = y.len();
        if n == 0 {
            return Self::new(0, rank, 0.0, 0.0);
        }

        let mean = y.sum() / n as f64;
        let ss_res: f64 = y.iter().zip(y_pred).map(|(a, b)| (a - b).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|a| (a - mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Self::new(n, rank, r2, (ss_res / n as f64).sqrt())
    }

    /// Returns the number of samples used by the fit.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Returns the numerical rank of the centred feature matrix.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the training-set coefficient of determination.
    pub fn r2(&self) -> f64 {
        self.r2
    }

    /// Returns the training-set root mean squared error.
    pub fn rmse(&self) -> f64 {
        self.rmse
    }
}
