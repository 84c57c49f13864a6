//! I/O error types for dtwpar-io.

use std::path::PathBuf;

use dtwpar_dtw::DtwError;

/// Errors from input parsing, settings handling, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the input holds no records or a zero-length axis.
    #[error("empty dataset in {path}")]
    EmptyDataset {
        /// Path to the input file.
        path: PathBuf,
    },

    /// Returned when a pair file does not hold exactly one record per dimension of each series.
    #[error("expected {expected} records (2 x {dims} dimensions) in {path}, found {got}")]
    RecordCount {
        /// Path to the CSV file.
        path: PathBuf,
        /// Declared dimensionality.
        dims: usize,
        /// Expected number of records.
        expected: usize,
        /// Actual number of records.
        got: usize,
    },

    /// Returned when two dimensions of the same series have different lengths.
    #[error("inconsistent row length in {path}: row {row_index} has {got} values, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based record index.
        row_index: usize,
        /// Length of the first record of the same series.
        expected: usize,
        /// Length of this record.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based record index.
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when parsed values do not form a valid series.
    #[error("invalid series in {path}")]
    Series {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying validation error.
        source: DtwError,
    },

    /// Returned when a `.npy` file cannot be decoded as an `f64` array.
    #[error("cannot read tensor {path}")]
    TensorRead {
        /// Path to the `.npy` file.
        path: PathBuf,
        /// Underlying decoder error.
        source: ndarray_npy::ReadNpyError,
    },

    /// Returned when a tensor is neither `(N, T)` nor `(N, T, D)`.
    #[error("tensor {path} has rank {rank}, expected 2 (N, T) or 3 (N, T, D)")]
    TensorRank {
        /// Path to the `.npy` file.
        path: PathBuf,
        /// Rank found in the file.
        rank: usize,
    },

    /// Returned when the settings file is not valid JSON for [`Settings`](crate::Settings).
    #[error("cannot parse settings file {path}")]
    ConfigParse {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when writing a default settings file would overwrite an existing file.
    #[error("settings file already exists: {path}")]
    ConfigExists {
        /// Path that already exists.
        path: PathBuf,
    },

    /// Returned when a settings value is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when a metric name is not one of the supported point distances.
    #[error("unknown metric \"{name}\": expected one of euclidean, sqeuclidean, cityblock, chebyshev, minkowski")]
    UnknownMetric {
        /// The name that was given.
        name: String,
    },

    /// Returned when a DTW type is neither dependent nor independent.
    #[error("unknown DTW type \"{name}\": expected dependent (d) or independent (i)")]
    UnknownDtwType {
        /// The name that was given.
        name: String,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result or settings file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV result writer fails.
    #[error("cannot write CSV {path}")]
    CsvWrite {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a value cannot be serialized to JSON.
    #[error("JSON serialization failed")]
    Serialize(#[from] serde_json::Error),
}
