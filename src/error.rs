use std::{error::Error, fmt, io, path::PathBuf};

use ml_core::{DataError, MlError};

/// The trainer's result type.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// Why a dataset line could not be turned into a row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowFault {
    /// The row has a different number of columns than the first row.
    ColumnCount { got: usize, expected: usize },
    /// A field is empty or not a number.
    Unparsable { field: usize, token: String },
    /// A field parsed to `NaN` or an infinity.
    NonFinite { field: usize, token: String },
    /// The line is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for RowFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFault::ColumnCount { got, expected } => {
                write!(f, "expected {expected} columns, got {got}")
            }
            RowFault::Unparsable { field, token } => {
                write!(f, "field {field}: cannot parse '{token}' as a number")
            }
            RowFault::NonFinite { field, token } => {
                write!(f, "field {field}: '{token}' is not a finite number")
            }
            RowFault::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
        }
    }
}

/// Training pipeline failures.
#[derive(Debug)]
pub enum TrainErr {
    /// The dataset file does not exist.
    MissingInput { path: PathBuf },
    /// A dataset line is not a valid row. `line` is 1-based.
    MalformedRow { line: usize, fault: RowFault },
    /// The dataset has no rows.
    EmptyDataset { path: PathBuf },
    /// The dataset width does not match the column layout.
    LayoutMismatch { got: usize, expected: usize },
    /// Fitting one target column failed; the whole run is aborted.
    Fit { target: String, source: MlError },
    /// Preparing the feature matrix failed.
    Preprocess(MlError),
    /// Column selection failed.
    Data(DataError),
    /// The parameter file could not be written.
    OutputWrite { path: PathBuf, source: io::Error },
    /// A parameter file does not follow the expected layout.
    ParamsFormat { line: usize, reason: String },
    /// An environment variable or layout file is invalid.
    Config(String),
    Io(io::Error),
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::MissingInput { path } => {
                write!(f, "dataset {} not found", path.display())
            }
            TrainErr::MalformedRow { line, fault } => {
                write!(f, "malformed row at line {line}: {fault}")
            }
            TrainErr::EmptyDataset { path } => {
                write!(f, "dataset {} contains no rows", path.display())
            }
            TrainErr::LayoutMismatch { got, expected } => write!(
                f,
                "dataset has {got} columns but the column layout expects {expected}"
            ),
            TrainErr::Fit { target, source } => write!(f, "fitting {target} failed: {source}"),
            TrainErr::Preprocess(e) => write!(f, "preprocessing failed: {e}"),
            TrainErr::Data(e) => write!(f, "data error: {e}"),
            TrainErr::OutputWrite { path, source } => {
                write!(f, "cannot write {}: {source}", path.display())
            }
            TrainErr::ParamsFormat { line, reason } => {
                write!(f, "invalid parameter file at line {line}: {reason}")
            }
            TrainErr::Config(msg) => write!(f, "invalid configuration: {msg}"),
            TrainErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Fit { source, .. } => Some(source),
            TrainErr::Preprocess(e) => Some(e),
            TrainErr::Data(e) => Some(e),
            TrainErr::OutputWrite { source, .. } => Some(source),
            TrainErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DataError> for TrainErr {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}
