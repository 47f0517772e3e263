use std::path::PathBuf;

use log::info;
use ml_core::{FitStats, LeastSquares, Regressor, SampleTable};

use crate::{load_samples, ColumnLayout, ModelParams, Result, TrainConfig, TrainErr};

/// Training statistics of one target column.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub name: String,
    pub stats: FitStats,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub samples: usize,
    pub output: PathBuf,
    pub targets: Vec<TargetReport>,
}

/// Fits every target of `layout` against the same prepared features.
///
/// # Args
/// * `table` - The loaded samples.
/// * `layout` - Which columns are features and targets.
/// * `regressor` - The solver used for every target.
///
/// # Returns
/// The parameters in output order and one report per target.
///
/// # Errors
/// Fails on the first target that cannot be fit; no partial result is
/// returned.
pub fn train<R: Regressor>(
    table: &SampleTable,
    layout: &ColumnLayout,
    regressor: &R,
) -> Result<(ModelParams, Vec<TargetReport>)> {
    let expected = layout.width();
    if table.width() != expected {
        return Err(TrainErr::LayoutMismatch {
            got: table.width(),
            expected,
        });
    }

    let raw = table.select(&layout.feature_columns())?;
    let features = layout
        .preprocessor()
        .prepare(raw)
        .map_err(TrainErr::Preprocess)?;

    if features.standardization.is_some() {
        info!("standardized {} features", layout.num_features());
    }

    let mut models = Vec::with_capacity(layout.targets.len());
    let mut reports = Vec::with_capacity(layout.targets.len());

    for target in &layout.targets {
        let y = table.column(target.column)?;
        let fitted = regressor
            .fit(features.matrix.view(), y)
            .map_err(|source| TrainErr::Fit {
                target: target.name.clone(),
                source,
            })?;

        info!(
            "{}: r2 {:.6}, rmse {:.6}, rank {} over {} samples",
            target.name,
            fitted.stats.r2(),
            fitted.stats.rmse(),
            fitted.stats.rank(),
            fitted.stats.samples()
        );

        models.push(fitted.model);
        reports.push(TargetReport {
            name: target.name.clone(),
            stats: fitted.stats,
        });
    }

    let params = ModelParams::new(models, features.standardization)?;
    Ok((params, reports))
}

/// Runs the whole pipeline once: load, prepare, fit, write.
///
/// Nothing is written unless every target was fit.
pub fn run(config: &TrainConfig) -> Result<RunSummary> {
    let table = load_samples(config.dataset())?;
    let regressor = LeastSquares::new(config.rank_policy());
    info!("fitting with rank policy {:?}", regressor.policy());

    let (params, targets) = train(&table, config.layout(), &regressor)?;
    params.save(config.output())?;

    Ok(RunSummary {
        samples: table.nrows(),
        output: config.output().to_path_buf(),
        targets,
    })
}
