use std::fmt;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Errors produced while building or accessing a sample table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The table has no rows (or no columns).
    Empty,

    /// A row does not have the same number of columns as the first one.
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        got: usize,
        expected: usize,
    },

    /// The requested column index is outside the table.
    OutOfBounds { column: usize, width: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Empty => write!(f, "sample table is empty"),
            DataError::RaggedRow { row, got, expected } => {
                write!(f, "row {row} has {got} columns, expected {expected}")
            }
            DataError::OutOfBounds { column, width } => {
                write!(f, "column {column} is out of bounds for a table of width {width}")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// An in-memory, rectangular table of `f64` samples.
///
/// Column meaning is positional: the table itself knows nothing about which
/// columns are features and which are targets.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    data: Array2<f64>,
}

impl SampleTable {
    /// Builds a table from owned rows.
    ///
    /// # Args
    /// * `rows` - The rows, all of which must have the width of the first one.
    ///
    /// # Returns
    /// The table, or a `DataError` if it would be empty or ragged.
    pub fn from_rows<I>(rows: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        let mut width = None;
        let mut nrows = 0;
        let mut flat = Vec::new();

        for (row, values) in rows.into_iter().enumerate() {
            let expected = *width.get_or_insert(values.len());
            if values.len() != expected {
                return Err(DataError::RaggedRow {
                    row,
                    got: values.len(),
                    expected,
                });
            }

            flat.extend(values);
            nrows += 1;
        }

        let width = width.unwrap_or(0);
        let data = Array2::from_shape_vec((nrows, width), flat).map_err(|_| DataError::Empty)?;
        Self::from_array(data)
    }

    /// Wraps an existing array, rejecting empty ones.
    pub fn from_array(data: Array2<f64>) -> Result<Self, DataError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(DataError::Empty);
        }

        Ok(Self { data })
    }

    /// Number of samples.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns in every row.
    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Returns a single column as a view.
    ///
    /// # Errors
    /// Returns `DataError::OutOfBounds` if `column` is not in the table.
    pub fn column(&self, column: usize) -> Result<ArrayView1<'_, f64>, DataError> {
        self.check(column)?;
        Ok(self.data.column(column))
    }

    /// Copies the given columns, in the given order, into a new matrix.
    ///
    /// # Errors
    /// Returns `DataError::OutOfBounds` if any index is not in the table.
    pub fn select(&self, columns: &[usize]) -> Result<Array2<f64>, DataError> {
        for &column in columns {
            self.check(column)?;
        }

        Ok(self.data.select(Axis(1), columns))
    }

    fn check(&self, column: usize) -> Result<(), DataError> {
        let width = self.width();
        if column >= width {
            return Err(DataError::OutOfBounds { column, width });
        }

        Ok(())
    }
}
