use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::info;
use ml_core::SampleTable;

use crate::{Result, RowFault, TrainErr};

/// Reads a headerless, delimited sample file.
///
/// Lines containing a comma are split on commas (each field trimmed);
/// other lines are split on whitespace. Blank lines are ignored.
///
/// # Errors
/// - `TrainErr::MissingInput` if `path` does not exist.
/// - `TrainErr::MalformedRow` for ragged rows, lines that are not UTF-8,
///   or fields that are not finite numbers.
/// - `TrainErr::EmptyDataset` if the file has no rows.
pub fn load_samples(path: &Path) -> Result<SampleTable> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TrainErr::MissingInput {
            path: path.to_path_buf(),
        },
        _ => TrainErr::Io(e),
    })?;

    let table = read_samples(BufReader::new(file)).map_err(|e| match e {
        TrainErr::EmptyDataset { .. } => TrainErr::EmptyDataset {
            path: path.to_path_buf(),
        },
        other => other,
    })?;

    info!(
        "loaded {} rows x {} columns from {}",
        table.nrows(),
        table.width(),
        path.display()
    );

    Ok(table)
}

/// Parses samples from any buffered reader. See [`load_samples`].
pub fn read_samples<R: BufRead>(reader: R) -> Result<SampleTable> {
    let mut rows = Vec::new();
    let mut width = None;

    for (i, bytes) in reader.split(b'\n').enumerate() {
        let lineno = i + 1;
        let line = String::from_utf8(bytes?).map_err(|_| TrainErr::MalformedRow {
            line: lineno,
            fault: RowFault::InvalidUtf8,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let row = parse_row(&line).map_err(|fault| TrainErr::MalformedRow {
            line: lineno,
            fault,
        })?;

        let expected = *width.get_or_insert(row.len());
        if row.len() != expected {
            return Err(TrainErr::MalformedRow {
                line: lineno,
                fault: RowFault::ColumnCount {
                    got: row.len(),
                    expected,
                },
            });
        }

        rows.push(row);
    }

    if rows.is_empty() {
        return Err(TrainErr::EmptyDataset {
            path: Default::default(),
        });
    }

    Ok(SampleTable::from_rows(rows)?)
}

fn parse_row(line: &str) -> std::result::Result<Vec<f64>, RowFault> {
    let line = line.trim();
    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };

    fields
        .into_iter()
        .enumerate()
        .map(|(field, token)| parse_field(field, token))
        .collect()
}

fn parse_field(field: usize, token: &str) -> std::result::Result<f64, RowFault> {
    let value = token.parse::<f64>().map_err(|_| RowFault::Unparsable {
        field,
        token: token.to_string(),
    })?;

    if !value.is_finite() {
        return Err(RowFault::NonFinite {
            field,
            token: token.to_string(),
        });
    }

    Ok(value)
}
