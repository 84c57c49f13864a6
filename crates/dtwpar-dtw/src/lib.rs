//! Dynamic Time Warping distances for univariate and multivariate series.
//!
//! Pure math library with no I/O. Provides pairwise DTW in dependent and
//! independent multivariate modes with optional alignment traces, and a
//! batch evaluator that fills a distance matrix on a fixed worker pool.

mod assemble;
mod batch;
mod distance;
mod dtw;
mod error;
mod grid;
mod matrix;
mod metric;
mod path;
mod series;
mod trace;

pub use assemble::{Assembled, TraceBundle};
pub use batch::{BatchDtw, CancelFlag, batch_dtw};
pub use distance::DtwDistance;
pub use dtw::{Dtw, DtwResult, MultivariateMode, pairwise_dtw};
pub use error::DtwError;
pub use grid::{AccumulatedCostMatrix, CostMatrix, Grid};
pub use matrix::DistanceMatrix;
pub use metric::{Chebyshev, Euclidean, Manhattan, MetricFn, Minkowski, PointDistance, SquaredEuclidean};
pub use path::{WarpingPath, WarpingStep};
pub use series::{Series, SeriesCollection, SeriesView};
pub use trace::{DimensionTrace, DtwTrace};
