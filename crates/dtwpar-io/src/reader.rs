//! Delimited pair reader with full input validation.

use std::path::{Path, PathBuf};

use dtwpar_dtw::Series;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::SeriesPair;

/// Reads two series from a delimited text file.
///
/// Expected format:
/// - No header row
/// - One record per dimension, values separated by the delimiter (`;` by default)
/// - Exactly `2 * dims` records: the first `dims` belong to `x`, the rest to `y`
/// - All records of one series have the same length; `x` and `y` may differ
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | Zero records |
/// | [`IoError::RecordCount`] | Record count is not `2 * dims` |
/// | [`IoError::InconsistentRowLength`] | Dimensions of one series differ in length |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::Series`] | `dims` is zero or a series is otherwise invalid |
pub struct PairReader {
    path: PathBuf,
    dims: usize,
    delimiter: u8,
}

impl PairReader {
    /// Create a reader for `dims`-dimensional series stored at `path`.
    pub fn new(path: &Path, dims: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            dims,
            delimiter: b';',
        }
    }

    /// Override the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and validate the file, returning a [`SeriesPair`].
    #[instrument(skip(self), fields(path = %self.path.display(), dims = self.dims))]
    pub fn read(&self) -> Result<SeriesPair, IoError> {
        if self.dims == 0 {
            return Err(IoError::Series {
                path: self.path.clone(),
                source: dtwpar_dtw::DtwError::InvalidDimensionality,
            });
        }

        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets ragged records through so InconsistentRowLength
        // fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            // Rows belonging to the same series must agree in length.
            let first_of_series = if row_index < self.dims { 0 } else { self.dims };
            if let Some(expected) = rows.get(first_of_series).map(Vec::len)
                && record.len() != expected
            {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let mut values = Vec::with_capacity(record.len());
            for (col_index, raw) in record.iter().enumerate() {
                let value: f64 = raw.parse().map_err(|_| IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    });
                }
                values.push(value);
            }
            rows.push(values);
        }
        debug!(records = rows.len(), "read pair records");

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        let expected = 2 * self.dims;
        if rows.len() != expected {
            return Err(IoError::RecordCount {
                path: self.path.clone(),
                dims: self.dims,
                expected,
                got: rows.len(),
            });
        }

        let y_rows = rows.split_off(self.dims);
        let x = self.series(rows)?;
        let y = self.series(y_rows)?;

        info!(x_len = x.len(), y_len = y.len(), dims = self.dims, "pair loaded");
        Ok(SeriesPair { x, y })
    }

    fn series(&self, rows: Vec<Vec<f64>>) -> Result<Series, IoError> {
        Series::from_dimensions(rows).map_err(|source| IoError::Series {
            path: self.path.clone(),
            source,
        })
    }
}
