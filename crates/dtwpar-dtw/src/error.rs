//! Error types for series construction, DTW alignment and batch evaluation.

/// Errors from series validation, pairwise DTW and batch DTW.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a series is built from zero observations.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at flat index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value in the flat buffer.
        index: usize,
    },

    /// Returned when a series is declared with zero values per observation.
    #[error("observation dimensionality must be at least 1")]
    InvalidDimensionality,

    /// Returned when a flat buffer does not split into whole observations.
    #[error("{len} values cannot be split into observations of dimensionality {dims}")]
    RaggedObservations {
        /// Number of values in the flat buffer.
        len: usize,
        /// Declared dimensionality.
        dims: usize,
    },

    /// Returned when per-observation or per-dimension rows have different lengths.
    #[error("row {dimension} has {got} values, expected {expected}")]
    InconsistentDimensionLength {
        /// Index of the offending row.
        dimension: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// Returned when a collection is built from zero series.
    #[error("series collection must be non-empty")]
    EmptyCollection,

    /// Returned when a collection member differs in dimensionality from the first member.
    #[error("collection member {index} has dimensionality {got}, expected {expected}")]
    NonUniformCollection {
        /// Position of the offending member.
        index: usize,
        /// Dimensionality of the first member.
        expected: usize,
        /// Dimensionality of the offending member.
        got: usize,
    },

    /// Returned when two compared series have different per-observation dimensionality.
    #[error("dimensionality mismatch: left series has {left}, right series has {right}")]
    DimensionalityMismatch {
        /// Dimensionality of the first series.
        left: usize,
        /// Dimensionality of the second series.
        right: usize,
    },

    /// Returned when the two collections of a batch are not dimensioned alike.
    #[error("shape mismatch at pair ({row}, {col}): dimensionality {left} vs {right}")]
    ShapeMismatch {
        /// Row index of the first offending pair.
        row: usize,
        /// Column index of the first offending pair.
        col: usize,
        /// Dimensionality of the row collection.
        left: usize,
        /// Dimensionality of the column collection.
        right: usize,
    },

    /// Returned when the point distance yields a negative, NaN or infinite value.
    #[error("point distance returned invalid value {value} at cell ({i}, {j}){}", in_dimension(.dimension))]
    MetricFailure {
        /// Observation index in the first series.
        i: usize,
        /// Observation index in the second series.
        j: usize,
        /// Projected dimension, for independent mode.
        dimension: Option<usize>,
        /// The offending value.
        value: f64,
    },

    /// Returned when finite point distances add up past the range of `f64`.
    #[error("accumulated cost overflowed{}", in_dimension(.dimension))]
    AccumulationOverflow {
        /// Projected dimension whose grid overflowed; `None` for the
        /// dependent grid or the sum over dimensions.
        dimension: Option<usize>,
    },

    /// Wraps the first pairwise failure of a batch, in row-major order.
    #[error("batch pair ({row}, {col}) failed: {source}")]
    PairFailed {
        /// Index into the row collection.
        row: usize,
        /// Index into the column collection.
        col: usize,
        /// The pairwise error.
        source: Box<DtwError>,
    },

    /// Returned when a batch is configured with zero workers.
    #[error("worker count must be at least 1, got {workers}")]
    InvalidWorkerCount {
        /// The invalid worker count.
        workers: usize,
    },

    /// Returned when the worker pool cannot be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Returned when a batch was cancelled before every cell completed.
    #[error("batch computation cancelled")]
    Cancelled,
}

fn in_dimension(dimension: &Option<usize>) -> String {
    dimension.map(|k| format!(" in dimension {k}")).unwrap_or_default()
}
