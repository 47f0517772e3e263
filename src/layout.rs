//! Positional column layouts of the sample file.
//!
//! A dataset has no header, so the meaning of every column is fixed by the
//! layout. The order of `targets` is also the order of the model lines in
//! the parameter file, which the inference runtime depends on.

use std::{collections::HashSet, fs, path::Path, str::FromStr};

use ml_core::Preprocessor;
use serde::{Deserialize, Serialize};

use crate::{Result, TrainErr};

/// Motion features shared by every variant, in file order.
const MOTION_FEATURES: [&str; 8] = [
    "input_sharpness",
    "input_magnitude",
    "input_right_foot_dist_ave",
    "input_left_foot_dist_ave",
    "input_right_hand_dist_ave",
    "input_left_hand_dist_ave",
    "input_head_dist_ave",
    "input_chest_val",
];

const INTERACTION_FEATURES: [&str; 2] = ["input_moving_ratio", "input_interaction"];

const KIRE_TARGET: &str = "target_kire";

const FURI_TARGETS: [&str; 7] = [
    "target_furi_0",
    "target_furi_1",
    "target_furi_2",
    "target_furi_3",
    "target_furi_4",
    "target_furi_5",
    "target_furi_6",
];

const BEZIER_TARGETS: [&str; 4] = [
    "target_bz_1x",
    "target_bz_1y",
    "target_bz_2x",
    "target_bz_2y",
];

/// A named column of the sample file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    pub column: usize,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column: usize) -> Self {
        Self {
            name: name.into(),
            column,
        }
    }
}

/// Which columns are features, which are targets, and whether the features
/// are standardized before fitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnLayout {
    #[serde(default)]
    pub standardize: bool,
    pub features: Vec<ColumnSpec>,
    pub targets: Vec<ColumnSpec>,
}

impl ColumnLayout {
    /// Eight raw motion features, kire and seven furi targets (16 columns).
    pub fn legacy() -> Self {
        let features = sequential(&MOTION_FEATURES, 0);
        let targets = sequential(
            &[KIRE_TARGET].iter().chain(&FURI_TARGETS).copied().collect::<Vec<_>>(),
            features.len(),
        );

        Self {
            standardize: false,
            features,
            targets,
        }
    }

    /// Ten standardized features, kire, seven furi and four Bézier control
    /// point targets (22 columns).
    pub fn standardized() -> Self {
        let feature_names: Vec<_> = MOTION_FEATURES
            .iter()
            .chain(&INTERACTION_FEATURES)
            .copied()
            .collect();
        let target_names: Vec<_> = [KIRE_TARGET]
            .iter()
            .chain(&FURI_TARGETS)
            .chain(&BEZIER_TARGETS)
            .copied()
            .collect();

        let features = sequential(&feature_names, 0);
        let targets = sequential(&target_names, features.len());

        Self {
            standardize: true,
            features,
            targets,
        }
    }

    /// Parses and validates a layout from JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(content)
            .map_err(|e| TrainErr::Config(format!("invalid layout JSON: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Reads a layout from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TrainErr::Config(format!("cannot read '{}': {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Checks that the layout can describe a dataset.
    ///
    /// # Errors
    /// Returns `TrainErr::Config` if features or targets are empty, a column
    /// is used twice, or two targets share a name.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(TrainErr::Config("layout has no feature columns".into()));
        }
        if self.targets.is_empty() {
            return Err(TrainErr::Config("layout has no target columns".into()));
        }

        let mut columns = HashSet::new();
        for spec in self.features.iter().chain(&self.targets) {
            if !columns.insert(spec.column) {
                return Err(TrainErr::Config(format!(
                    "column {} is used more than once ({})",
                    spec.column, spec.name
                )));
            }
        }

        let mut names = HashSet::new();
        for spec in &self.targets {
            if !names.insert(spec.name.as_str()) {
                return Err(TrainErr::Config(format!(
                    "target {} is listed more than once",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Number of columns a dataset must have for this layout.
    pub fn width(&self) -> usize {
        self.features
            .iter()
            .chain(&self.targets)
            .map(|spec| spec.column + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn feature_columns(&self) -> Vec<usize> {
        self.features.iter().map(|spec| spec.column).collect()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn preprocessor(&self) -> Preprocessor {
        if self.standardize {
            Preprocessor::Standardize
        } else {
            Preprocessor::Identity
        }
    }
}

fn sequential(names: &[&str], start: usize) -> Vec<ColumnSpec> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnSpec::new(*name, start + i))
        .collect()
}

/// The built-in dataset layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Ten standardized features, twelve targets.
    #[default]
    Standardized,
    /// Eight raw features, eight targets.
    Legacy,
}

impl Variant {
    pub fn layout(self) -> ColumnLayout {
        match self {
            Variant::Standardized => ColumnLayout::standardized(),
            Variant::Legacy => ColumnLayout::legacy(),
        }
    }
}

impl FromStr for Variant {
    type Err = TrainErr;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "standardized" => Ok(Variant::Standardized),
            "legacy" => Ok(Variant::Legacy),
            other => Err(TrainErr::Config(format!("unknown variant: {other}"))),
        }
    }
}
