//! The `model_params.txt` format shared with the inference runtime.
//!
//! ```text
//! w_0 .. w_{F-1} intercept        one line per target, in layout order
//! m_0 .. m_{F-1}                  feature means      (standardized only)
//! s_0 .. s_{F-1}                  feature scales     (standardized only)
//! ```
//!
//! Tokens are separated by a single space and every value is written in
//! its shortest round-trip decimal form.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::info;
use ml_core::{LinearModel, Standardization};
use ndarray::{Array1, ArrayView1};
use tempfile::NamedTempFile;

use crate::{ColumnLayout, Result, TrainErr};

/// Everything the inference runtime needs: the models in output order and,
/// for standardized layouts, the feature statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    models: Vec<LinearModel>,
    standardization: Option<Standardization>,
}

impl ModelParams {
    /// Creates a new `ModelParams`.
    ///
    /// # Errors
    /// Returns `TrainErr::Config` if there are no models, or if the models
    /// and statistics disagree on the number of features.
    pub fn new(
        models: Vec<LinearModel>,
        standardization: Option<Standardization>,
    ) -> Result<Self> {
        let first = models
            .first()
            .ok_or_else(|| TrainErr::Config("no models to write".into()))?;
        let num_features = first.num_features();

        let stats_features = standardization.as_ref().map(Standardization::num_features);
        if models.iter().any(|m| m.num_features() != num_features)
            || stats_features.is_some_and(|n| n != num_features)
        {
            return Err(TrainErr::Config(
                "models and statistics disagree on the number of features".into(),
            ));
        }

        Ok(Self {
            models,
            standardization,
        })
    }

    pub fn models(&self) -> &[LinearModel] {
        &self.models
    }

    pub fn standardization(&self) -> Option<&Standardization> {
        self.standardization.as_ref()
    }

    /// Writes the parameter lines to `w`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.render().as_bytes())
    }

    /// Renders the file contents in memory.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for model in &self.models {
            let intercept = model.intercept();
            out += &join_line(model.weights().iter().chain([&intercept]));
        }

        if let Some(stats) = &self.standardization {
            out += &join_line(stats.means());
            out += &join_line(stats.scales());
        }

        out
    }

    /// Atomically replaces `path` with the parameter file.
    ///
    /// The contents go to a temporary file in the same directory, which is
    /// flushed and synced before being renamed over `path`. On error the
    /// temporary file is removed and `path` is left untouched.
    ///
    /// # Errors
    /// Returns `TrainErr::OutputWrite` on any filesystem failure.
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source: io::Error| TrainErr::OutputWrite {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut w = BufWriter::new(tmp.as_file_mut());
            self.write_to(&mut w).map_err(write_err)?;
            w.flush().map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        info!(
            "wrote {} models to {}",
            self.models.len(),
            path.display()
        );
        Ok(())
    }

    /// Parses a parameter file written for `layout`.
    ///
    /// # Errors
    /// Returns `TrainErr::ParamsFormat` if the number of lines or tokens
    /// does not match the layout, or a token is not a finite number.
    pub fn parse(content: &str, layout: &ColumnLayout) -> Result<Self> {
        let num_features = layout.num_features();
        let num_models = layout.targets.len();
        let expected_lines = num_models + if layout.standardize { 2 } else { 0 };

        let lines: Vec<(usize, &str)> = content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| (i + 1, l))
            .collect();

        if lines.len() != expected_lines {
            // Point at the first surplus line, or just past the end when short.
            let line = match lines.get(expected_lines) {
                Some(&(line, _)) => line,
                None => content.lines().count() + 1,
            };
            return Err(TrainErr::ParamsFormat {
                line,
                reason: format!("expected {expected_lines} lines, found {}", lines.len()),
            });
        }

        let mut models = Vec::with_capacity(num_models);
        for &(line, text) in &lines[..num_models] {
            let mut values = parse_line(line, text, num_features + 1)?;
            let intercept = values.pop().unwrap_or_default();
            let model = LinearModel::new(Array1::from(values), intercept).map_err(|e| {
                TrainErr::ParamsFormat {
                    line,
                    reason: e.to_string(),
                }
            })?;
            models.push(model);
        }

        let standardization = if layout.standardize {
            let (mean_line, mean_text) = lines[num_models];
            let (scale_line, scale_text) = lines[num_models + 1];
            let means = parse_line(mean_line, mean_text, num_features)?;
            let scales = parse_line(scale_line, scale_text, num_features)?;

            let stats = Standardization::from_parts(Array1::from(means), Array1::from(scales))
                .map_err(|e| TrainErr::ParamsFormat {
                    line: scale_line,
                    reason: e.to_string(),
                })?;
            Some(stats)
        } else {
            None
        };

        Self::new(models, standardization)
    }

    /// Reads and parses a parameter file. See [`ModelParams::parse`].
    pub fn load(path: &Path, layout: &ColumnLayout) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?, layout)
    }

    /// Evaluates every model on one raw feature vector, the way the
    /// inference runtime does: standardize if statistics are present, then
    /// apply each model in output order.
    pub fn predict(&self, raw: ArrayView1<f64>) -> Result<Array1<f64>> {
        let x = match &self.standardization {
            Some(stats) => stats.transform_one(raw).map_err(TrainErr::Preprocess)?,
            None => raw.to_owned(),
        };

        self.models
            .iter()
            .map(|model| model.predict_one(x.view()).map_err(TrainErr::Preprocess))
            .collect()
    }
}

fn join_line<'a>(values: impl IntoIterator<Item = &'a f64>) -> String {
    let mut line = values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

fn parse_line(line: usize, text: &str, expected: usize) -> Result<Vec<f64>> {
    let values = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| TrainErr::ParamsFormat {
                    line,
                    reason: format!("cannot parse '{token}' as a finite number"),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() != expected {
        return Err(TrainErr::ParamsFormat {
            line,
            reason: format!("expected {expected} values, found {}", values.len()),
        });
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnSpec;
    use ndarray::array;

    fn layout(standardize: bool) -> ColumnLayout {
        ColumnLayout {
            standardize,
            features: vec![ColumnSpec::new("a", 0), ColumnSpec::new("b", 1)],
            targets: vec![ColumnSpec::new("y", 2), ColumnSpec::new("z", 3)],
        }
    }

    fn models() -> Vec<LinearModel> {
        vec![
            LinearModel::new(array![0.1, -2.5], 3.0).unwrap(),
            LinearModel::new(array![1e-17, 4.0], -0.3333333333333333).unwrap(),
        ]
    }

    #[test]
    fn renders_weights_then_intercept() {
        let params = ModelParams::new(models(), None).unwrap();

        assert_eq!(
            params.render(),
            "0.1 -2.5 3\n0.00000000000000001 4 -0.3333333333333333\n"
        );
    }

    #[test]
    fn renders_statistics_after_models() {
        let stats = Standardization::from_parts(array![1.5, 2.0], array![0.5, 1.0]).unwrap();
        let params = ModelParams::new(models(), Some(stats)).unwrap();
        let rendered = params.render();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "1.5 2");
        assert_eq!(lines[3], "0.5 1");
    }

    #[test]
    fn parse_reads_back_exact_values() {
        let stats = Standardization::from_parts(array![1.5, 2.0], array![0.5, 1.0]).unwrap();
        let params = ModelParams::new(models(), Some(stats)).unwrap();

        let parsed = ModelParams::parse(&params.render(), &layout(true)).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn parse_rejects_wrong_line_count() {
        let params = ModelParams::new(models(), None).unwrap();
        let err = ModelParams::parse(&params.render(), &layout(true)).unwrap_err();
        assert!(matches!(err, TrainErr::ParamsFormat { line: 3, .. }));

        let stats = Standardization::from_parts(array![1.5, 2.0], array![0.5, 1.0]).unwrap();
        let params = ModelParams::new(models(), Some(stats)).unwrap();
        let err = ModelParams::parse(&params.render(), &layout(false)).unwrap_err();
        assert!(matches!(err, TrainErr::ParamsFormat { line: 3, .. }));

        let err = ModelParams::parse("1 2 3\n\n\n4 5 6\n\n7 8 9\n", &layout(false)).unwrap_err();
        assert!(matches!(err, TrainErr::ParamsFormat { line: 6, .. }));
    }

    #[test]
    fn write_to_matches_render() {
        let stats = Standardization::from_parts(array![1.5, 2.0], array![0.5, 1.0]).unwrap();
        let params = ModelParams::new(models(), Some(stats)).unwrap();

        let mut buf = Vec::new();
        params.write_to(&mut buf).unwrap();
        assert_eq!(buf, params.render().into_bytes());
    }

    #[test]
    fn parse_rejects_wrong_token_count() {
        let err = ModelParams::parse("1 2 3\n4 5\n", &layout(false)).unwrap_err();
        assert!(matches!(err, TrainErr::ParamsFormat { line: 2, .. }));
    }

    #[test]
    fn predict_standardizes_before_applying_models() {
        let stats = Standardization::from_parts(array![1.0, 1.0], array![2.0, 1.0]).unwrap();
        let models = vec![LinearModel::new(array![1.0, 1.0], 0.5).unwrap()];
        let params = ModelParams::new(models, Some(stats)).unwrap();

        let y = params.predict(array![5.0, 3.0].view()).unwrap();
        assert_eq!(y.to_vec(), vec![4.5]);
    }

    #[test]
    fn new_rejects_mismatched_statistics() {
        let stats = Standardization::from_parts(array![0.0], array![1.0]).unwrap();
        assert!(ModelParams::new(models(), Some(stats)).is_err());
        assert!(ModelParams::new(Vec::new(), None).is_err());
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_params.txt");
        fs::write(&path, "stale\n").unwrap();

        let params = ModelParams::new(models(), None).unwrap();
        params.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), params.render());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("model_params.txt");

        let params = ModelParams::new(models(), None).unwrap();
        let err = params.save(&path).unwrap_err();

        assert!(matches!(err, TrainErr::OutputWrite { .. }));
        assert!(!path.exists());
    }
}
