use std::fmt;

/// Errors produced by the regression core when inputs cannot be fit.
#[derive(Debug, Clone, PartialEq)]
pub enum MlError {
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),

    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "targets", "weights").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// The centred feature matrix does not have full column rank and the
    /// active policy refuses to pick a minimum-norm solution.
    RankDeficient {
        /// Numerical rank of the centred feature matrix.
        rank: usize,
        /// Number of feature columns (full rank).
        expected: usize,
    },

    /// The decomposition could not produce a solution.
    Solver(&'static str),

    /// A computed quantity was `NaN` or infinite.
    NonFinite(&'static str),
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            MlError::ShapeMismatch { what, got, expected } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlError::RankDeficient { rank, expected } => {
                write!(f, "feature matrix is rank deficient: rank {rank} of {expected} columns")
            }
            MlError::Solver(msg) => write!(f, "least squares solver failed: {msg}"),
            MlError::NonFinite(what) => write!(f, "non-finite value in {what}"),
        }
    }
}

impl std::error::Error for MlError {}
