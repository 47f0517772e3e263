use std::{
    env,
    path::{Path, PathBuf},
};

use ml_core::RankPolicy;

use crate::{ColumnLayout, Result, TrainErr, Variant};

const DEFAULT_DATASET: &str = "dataset_all.csv";
const DEFAULT_OUTPUT: &str = "model_params.txt";

/// Immutable settings for one training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    dataset: PathBuf,
    output: PathBuf,
    layout: ColumnLayout,
    rank_policy: RankPolicy,
}

impl TrainConfig {
    /// Creates a new training configuration.
    ///
    /// # Args
    /// * `dataset` - Path of the sample file.
    /// * `output` - Path the parameter file is written to.
    /// * `layout` - Column layout of the sample file.
    /// * `rank_policy` - How rank-deficient fits are handled.
    ///
    /// # Errors
    /// Returns `TrainErr::Config` if the layout is invalid.
    pub fn new(
        dataset: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        layout: ColumnLayout,
        rank_policy: RankPolicy,
    ) -> Result<Self> {
        layout.validate()?;

        Ok(Self {
            dataset: dataset.into(),
            output: output.into(),
            layout,
            rank_policy,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// Recognized variables: `DATASET`, `MODEL_PARAMS`, `VARIANT`, `LAYOUT`
    /// and `RANK_POLICY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dataset = lookup("DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string());
        let output = lookup("MODEL_PARAMS").unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

        let layout = match lookup("LAYOUT") {
            Some(path) => ColumnLayout::load(Path::new(&path))?,
            None => lookup("VARIANT")
                .map(|v| v.parse::<Variant>())
                .transpose()?
                .unwrap_or_default()
                .layout(),
        };

        let rank_policy = lookup("RANK_POLICY")
            .map(|v| parse_rank_policy(&v))
            .transpose()?
            .unwrap_or_default();

        Self::new(dataset, output, layout, rank_policy)
    }

    pub fn dataset(&self) -> &Path {
        &self.dataset
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn rank_policy(&self) -> RankPolicy {
        self.rank_policy
    }
}

fn parse_rank_policy(s: &str) -> Result<RankPolicy> {
    match s.trim() {
        "min_norm" => Ok(RankPolicy::MinimumNorm),
        "reject" => Ok(RankPolicy::Reject),
        other => Err(TrainErr::Config(format!("unknown rank policy: {other}"))),
    }
}
