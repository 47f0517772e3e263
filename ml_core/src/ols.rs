use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::{FitStats, Fitted, LinearModel, MlError, Regressor};

/// What to do when the centred feature matrix is rank deficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankPolicy {
    /// Return the minimum-norm least-squares solution.
    #[default]
    MinimumNorm,
    /// Fail with `MlError::RankDeficient`.
    Reject,
}

/// Ordinary least squares with an intercept, solved in closed form.
///
/// Features and target are centred, the centred problem is solved with an
/// SVD and the intercept is recovered from the means. Singular values below
/// `σ_max · max(n, p) · ε` are treated as zero, as are singular values below
/// `ε · max(n, p) · max|x| · √n`, the rounding noise left by centring.
/// Columns that are exactly constant are centred to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares {
    policy: RankPolicy,
}

impl LeastSquares {
    /// Creates a new `LeastSquares` solver.
    ///
    /// # Args
    /// * `policy` - How rank-deficient problems are handled.
    pub fn new(policy: RankPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RankPolicy {
        self.policy
    }
}

impl Regressor for LeastSquares {
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Fitted, MlError> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(MlError::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: n,
            });
        }
        if n == 0 {
            return Err(MlError::InvalidInput("cannot fit on zero samples"));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(MlError::NonFinite("training data"));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or(MlError::InvalidInput("cannot fit on zero samples"))?;
        let y_mean = y
            .mean()
            .ok_or(MlError::InvalidInput("cannot fit on zero samples"))?;

        let mut xc = &x - &x_mean;
        for (j, mut column) in xc.columns_mut().into_iter().enumerate() {
            let raw = x.column(j);
            if raw.iter().all(|&v| v == raw[0]) {
                column.fill(0.0);
            }
        }
        let yc = &y - y_mean;

        let magnitude = x.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        let floor = f64::EPSILON * n.max(p) as f64 * magnitude * (n as f64).sqrt();
        let (weights, rank) = solve_min_norm(xc.view(), yc.view(), floor)?;

        debug!("least squares on {n}x{p}: rank {rank}");
        if rank < p {
            match self.policy {
                RankPolicy::Reject => return Err(MlError::RankDeficient { rank, expected: p }),
                RankPolicy::MinimumNorm => {
                    warn!("rank {rank} of {p} features, using the minimum-norm solution")
                }
            }
        }

        let intercept = y_mean - weights.dot(&x_mean);
        let model = LinearModel::new(weights, intercept)?;
        let y_pred = model.predict(x)?;
        let stats = FitStats::from_residuals(y, y_pred.view(), rank);

        Ok(Fitted { model, stats })
    }
}

/// Minimum-norm solution of `xc · w ≈ yc` via the pseudo-inverse.
///
/// # Args
/// * `floor` - Absolute cutoff below which singular values count as zero.
///
/// # Returns
/// The weights and the numerical rank of `xc`.
fn solve_min_norm(
    xc: ArrayView2<f64>,
    yc: ArrayView1<f64>,
    floor: f64,
) -> Result<(Array1<f64>, usize), MlError> {
    let (n, p) = xc.dim();
    if p == 0 {
        return Ok((Array1::zeros(0), 0));
    }

    let a = DMatrix::from_fn(n, p, |i, j| xc[[i, j]]);
    let b = DVector::from_iterator(n, yc.iter().copied());

    let svd = a.svd(true, true);
    let relative = svd.singular_values.max() * n.max(p) as f64 * f64::EPSILON;
    let tol = relative.max(floor);
    let rank = svd.singular_values.iter().filter(|&&s| s > tol).count();

    let beta = svd.solve(&b, tol).map_err(MlError::Solver)?;
    Ok((beta.iter().copied().collect(), rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn assert_close(got: f64, expected: f64) {
        let tol = 1e-9 * expected.abs().max(1.0);
        assert!(
            (got - expected).abs() <= tol,
            "got {got}, expected {expected}"
        );
    }

    #[test]
    fn recovers_exact_linear_function() {
        let coef = [1.5, -2.0, 0.25, 4.0, -0.75];
        let c = 3.125;

        let mut rng = StdRng::seed_from_u64(7);
        let x = Array2::from_shape_fn((40, coef.len()), |_| rng.random_range(-10.0..10.0));
        let y = x.dot(&Array1::from(coef.to_vec())) + c;

        let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();

        for (w, a) in fitted.model.weights().iter().zip(coef) {
            assert_close(*w, a);
        }
        assert_close(fitted.model.intercept(), c);
        assert_eq!(fitted.stats.rank(), coef.len());
        assert_close(fitted.stats.r2(), 1.0);
    }

    #[test]
    fn collinear_columns_share_the_slope() {
        // Row i is [i; 10] with y = 2i + 5.
        let x = Array2::from_shape_fn((3, 10), |(i, _)| i as f64);
        let y = array![5.0, 7.0, 9.0];

        let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();

        assert_eq!(fitted.stats.rank(), 1);
        for w in fitted.model.weights() {
            assert_close(*w, 0.2);
        }
        assert_close(fitted.model.intercept(), 5.0);
    }

    #[test]
    fn reject_policy_fails_on_collinear_columns() {
        let x = Array2::from_shape_fn((3, 10), |(i, _)| i as f64);
        let y = array![5.0, 7.0, 9.0];

        let err = LeastSquares::new(RankPolicy::Reject)
            .fit(x.view(), y.view())
            .unwrap_err();
        assert_eq!(err, MlError::RankDeficient { rank: 1, expected: 10 });
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();
        let w = fitted.model.weights();

        assert_close(w[0], 2.0);
        assert!(w[1].abs() < 1e-12);
        assert_close(fitted.model.intercept(), 1.0);
    }

    #[test]
    fn all_constant_features_fall_back_to_the_mean() {
        let y = Array1::from_shape_fn(10, |i| 1.3 * i as f64 + 0.7);

        for width in [1, 2] {
            let x = Array2::from_elem((10, width), 0.1);
            let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();

            assert_eq!(fitted.stats.rank(), 0);
            assert!(fitted.model.weights().iter().all(|w| *w == 0.0));
            assert_close(fitted.model.intercept(), 6.55);
        }
    }

    #[test]
    fn reject_policy_fails_on_all_constant_features() {
        let x = Array2::from_elem((10, 1), 0.1);
        let y = Array1::from_shape_fn(10, |i| 1.3 * i as f64 + 0.7);

        let err = LeastSquares::new(RankPolicy::Reject)
            .fit(x.view(), y.view())
            .unwrap_err();
        assert_eq!(err, MlError::RankDeficient { rank: 0, expected: 1 });
    }

    #[test]
    fn nearly_constant_column_counts_as_rank_deficient() {
        // Column 1 wobbles at the level of rounding noise around 0.3.
        let x = Array2::from_shape_fn((7, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                0.1 + 0.2 + if i % 2 == 0 { 0.0 } else { 5e-17 }
            }
        });
        let y = Array1::from_shape_fn(7, |i| 2.0 * i as f64 - 1.0);

        let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();

        assert_eq!(fitted.stats.rank(), 1);
        assert_close(fitted.model.weights()[0], 2.0);
        assert!(fitted.model.weights()[1].abs() < 1e-6);
    }

    #[test]
    fn single_sample_predicts_its_target() {
        let x = array![[3.0, 4.0]];
        let y = array![10.0];

        let fitted = LeastSquares::default().fit(x.view(), y.view()).unwrap();

        assert!(fitted.model.weights().iter().all(|w| *w == 0.0));
        assert_eq!(fitted.model.intercept(), 10.0);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];

        assert!(matches!(
            LeastSquares::default().fit(x.view(), y.view()),
            Err(MlError::ShapeMismatch { what: "targets", got: 1, expected: 2 })
        ));
    }

    #[test]
    fn non_finite_data_is_rejected() {
        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];

        assert_eq!(
            LeastSquares::default().fit(x.view(), y.view()).unwrap_err(),
            MlError::NonFinite("training data")
        );
    }

    #[test]
    fn fits_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let x = Array2::from_shape_fn((25, 4), |_| rng.random_range(0.0..1.0));
        let y = Array1::from_shape_fn(25, |_| rng.random_range(0.0..1.0));

        let a = LeastSquares::default().fit(x.view(), y.view()).unwrap();
        let b = LeastSquares::default().fit(x.view(), y.view()).unwrap();
        assert_eq!(a.model, b.model);
    }
}
