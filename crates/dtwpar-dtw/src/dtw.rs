//! Pairwise DTW: cost construction, accumulation, traceback.

use tracing::instrument;

use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::grid::{AccumulatedCostMatrix, CostMatrix, Grid};
use crate::metric::PointDistance;
use crate::path::{WarpingPath, WarpingStep};
use crate::series::{Series, SeriesView};
use crate::trace::{DtwTrace, TraceBuilder};

/// How multivariate observations are aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MultivariateMode {
    /// All dimensions share one warping path; the point distance sees full observations.
    #[default]
    Dependent,
    /// Each dimension is warped on its own; the per-dimension distances are summed.
    Independent,
}

/// Outcome of one pairwise comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct DtwResult {
    distance: DtwDistance,
    trace: Option<DtwTrace>,
}

impl DtwResult {
    /// Return the DTW distance.
    #[must_use]
    pub fn distance(&self) -> DtwDistance {
        self.distance
    }

    /// Return the alignment trace, present only when visualization was requested.
    #[must_use]
    pub fn trace(&self) -> Option<&DtwTrace> {
        self.trace.as_ref()
    }

    /// Split into distance and optional trace.
    #[must_use]
    pub fn into_parts(self) -> (DtwDistance, Option<DtwTrace>) {
        (self.distance, self.trace)
    }
}

/// Immutable DTW configuration: a point distance plus a multivariate mode.
///
/// Thread-safe whenever the metric is, which [`PointDistance`] requires.
#[derive(Debug, Clone)]
pub struct Dtw<M> {
    metric: M,
    mode: MultivariateMode,
}

impl<M: PointDistance> Dtw<M> {
    /// Create a dependent-mode DTW calculator using `metric`.
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            mode: MultivariateMode::Dependent,
        }
    }

    /// Set the multivariate alignment mode.
    #[must_use]
    pub fn with_mode(mut self, mode: MultivariateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the multivariate alignment mode.
    #[must_use]
    pub fn mode(&self) -> MultivariateMode {
        self.mode
    }

    /// Return the point distance.
    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Compute the DTW distance between two series.
    ///
    /// Uses a rolling two-row buffer spanning the shorter series rather than the
    /// full accumulated grid, so memory is O(min(n, m)) per dimension. The result
    /// is bit-identical to [`align`][Dtw::align].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionalityMismatch`] | `x` and `y` differ in dimensionality |
    /// | [`DtwError::MetricFailure`] | The point distance returned a negative, NaN or infinite value |
/// | [`DtwError::AccumulationOverflow`] | The accumulated cost exceeded the range of `f64` |
    #[instrument(level = "debug", skip_all, fields(n = x.len(), m = y.len(), dims = x.dims()))]
    pub fn distance(&self, x: SeriesView<'_>, y: SeriesView<'_>) -> Result<DtwDistance, DtwError> {
        check_dims(x, y)?;
        match self.mode {
            MultivariateMode::Dependent => accumulate_rolling(&self.metric, x, y, None),
            MultivariateMode::Independent => {
                let mut total = DtwDistance::ZERO;
                for k in 0..x.dims() {
                    let (xk, yk) = (x.project(k), y.project(k));
                    let d = accumulate_rolling(&self.metric, xk.as_view(), yk.as_view(), Some(k))?;
                    total = finite_distance((total + d).value(), None)?;
                }
                Ok(total)
            }
        }
    }

    /// Compute the DTW distance together with cost grids and warping paths.
    ///
    /// Allocates full `n x m` grids, one set per dimension in independent mode.
    /// Use [`distance`][Dtw::distance] when only the scalar is needed.
    ///
    /// # Errors
    ///
    /// Same as [`distance`][Dtw::distance].
    #[instrument(level = "debug", skip_all, fields(n = x.len(), m = y.len(), dims = x.dims()))]
    pub fn align(&self, x: SeriesView<'_>, y: SeriesView<'_>) -> Result<DtwResult, DtwError> {
        check_dims(x, y)?;
        let (distance, builder) = match self.mode {
            MultivariateMode::Dependent => {
                let mut builder = TraceBuilder::with_capacity(1);
                let distance = align_dimension(&self.metric, x, y, None, &mut builder)?;
                (distance, builder)
            }
            MultivariateMode::Independent => {
                let mut builder = TraceBuilder::with_capacity(x.dims());
                let mut total = DtwDistance::ZERO;
                for k in 0..x.dims() {
                    let (xk, yk) = (x.project(k), y.project(k));
                    let (xv, yv) = (xk.as_view(), yk.as_view());
                    let d = align_dimension(&self.metric, xv, yv, Some(k), &mut builder)?;
                    total = finite_distance((total + d).value(), None)?;
                }
                (total, builder)
            }
        };
        Ok(DtwResult {
            distance,
            trace: Some(builder.build()),
        })
    }

    /// Compare two series, retaining the trace only when `visualize` is set.
    ///
    /// # Errors
    ///
    /// Same as [`distance`][Dtw::distance].
    pub fn compare(
        &self,
        x: SeriesView<'_>,
        y: SeriesView<'_>,
        visualize: bool,
    ) -> Result<DtwResult, DtwError> {
        if visualize {
            self.align(x, y)
        } else {
            Ok(DtwResult {
                distance: self.distance(x, y)?,
                trace: None,
            })
        }
    }
}

/// Compare two series with the given mode and point distance.
///
/// Convenience wrapper over [`Dtw::compare`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::DimensionalityMismatch`] | `x` and `y` differ in dimensionality |
/// | [`DtwError::MetricFailure`] | The point distance returned a negative, NaN or infinite value |
/// | [`DtwError::AccumulationOverflow`] | The accumulated cost exceeded the range of `f64` |
pub fn pairwise_dtw<M: PointDistance + ?Sized>(
    x: &Series,
    y: &Series,
    mode: MultivariateMode,
    metric: &M,
    visualize: bool,
) -> Result<DtwResult, DtwError> {
    Dtw::new(metric)
        .with_mode(mode)
        .compare(x.as_view(), y.as_view(), visualize)
}

fn check_dims(x: SeriesView<'_>, y: SeriesView<'_>) -> Result<(), DtwError> {
    if x.dims() != y.dims() {
        return Err(DtwError::DimensionalityMismatch {
            left: x.dims(),
            right: y.dims(),
        });
    }
    Ok(())
}

/// Evaluate the point distance for `(x[i], y[j])`, rejecting invalid values.
#[inline]
fn checked_cost<M: PointDistance>(
    metric: &M,
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    i: usize,
    j: usize,
    dimension: Option<usize>,
) -> Result<f64, DtwError> {
    let value = metric.distance(x.observation(i), y.observation(j));
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DtwError::MetricFailure {
            i,
            j,
            dimension,
            value,
        })
    }
}

/// Wrap a final accumulated cost; finite costs can still sum to infinity.
fn finite_distance(value: f64, dimension: Option<usize>) -> Result<DtwDistance, DtwError> {
    if value.is_finite() {
        Ok(DtwDistance::new(value))
    } else {
        Err(DtwError::AccumulationOverflow { dimension })
    }
}

/// Rolling two-row accumulation returning only the final cell.
///
/// The sweep runs along the longer series so both buffers span the shorter one.
/// When `y` is the longer series the sweep is transposed: outer index `o` is `j`
/// and inner index `k` is `i`. The recurrence is symmetric under transposition
/// and each cell performs the same additions and comparisons as
/// [`accumulate`], so the result matches the full grid bit for bit.
fn accumulate_rolling<M: PointDistance>(
    metric: &M,
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    dimension: Option<usize>,
) -> Result<DtwDistance, DtwError> {
    let (n, m) = (x.len(), y.len());
    let transposed = m > n;
    let (outer, inner) = if transposed { (m, n) } else { (n, m) };

    let mut prev = vec![0.0; inner];
    let mut curr = vec![0.0; inner];

    for o in 0..outer {
        for k in 0..inner {
            let c = if transposed {
                checked_cost(metric, x, y, k, o, dimension)?
            } else {
                checked_cost(metric, x, y, o, k, dimension)?
            };
            curr[k] = match (o, k) {
                (0, 0) => c,
                (0, _) => curr[k - 1] + c,
                (_, 0) => prev[0] + c,
                _ => c + prev[k].min(curr[k - 1]).min(prev[k - 1]),
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    // After the final swap, `prev` holds the last completed row.
    finite_distance(prev[inner - 1], dimension)
}

/// Full-grid alignment of one (possibly projected) pair; pushes its trace.
fn align_dimension<M: PointDistance>(
    metric: &M,
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    dimension: Option<usize>,
    builder: &mut TraceBuilder,
) -> Result<DtwDistance, DtwError> {
    let cost = cost_matrix(metric, x, y, dimension)?;
    let accumulated = accumulate(&cost);
    let path = backtrack(&accumulated);
    let distance = finite_distance(
        accumulated.get(accumulated.rows() - 1, accumulated.cols() - 1),
        dimension,
    )?;
    builder.push(dimension, cost, accumulated, path);
    Ok(distance)
}

fn cost_matrix<M: PointDistance>(
    metric: &M,
    x: SeriesView<'_>,
    y: SeriesView<'_>,
    dimension: Option<usize>,
) -> Result<CostMatrix, DtwError> {
    let (n, m) = (x.len(), y.len());
    let mut data = Vec::with_capacity(n * m);
    for i in 0..n {
        for j in 0..m {
            data.push(checked_cost(metric, x, y, i, j, dimension)?);
        }
    }
    Ok(Grid::from_raw(n, m, data))
}

/// Run the DTW recurrence over a complete cost grid.
///
/// `acc[0][0] = cost[0][0]`, the first row and column are prefix sums, and
/// `acc[i][j] = cost[i][j] + min(acc[i-1][j], acc[i][j-1], acc[i-1][j-1])`.
fn accumulate(cost: &CostMatrix) -> AccumulatedCostMatrix {
    let (n, m) = (cost.rows(), cost.cols());
    let mut acc = vec![0.0; n * m];

    for i in 0..n {
        for j in 0..m {
            let c = cost.get(i, j);
            acc[i * m + j] = match (i, j) {
                (0, 0) => c,
                (0, _) => acc[j - 1] + c,
                (_, 0) => acc[(i - 1) * m] + c,
                _ => {
                    let above = acc[(i - 1) * m + j];
                    let left = acc[i * m + j - 1];
                    let diag = acc[(i - 1) * m + j - 1];
                    c + above.min(left).min(diag)
                }
            };
        }
    }

    Grid::from_raw(n, m, acc)
}

/// Trace the optimal path from `(n-1, m-1)` back to `(0, 0)`.
///
/// At each interior cell the predecessor with the smallest accumulated cost
/// wins; ties prefer diagonal, then vertical (`i-1`), then horizontal (`j-1`).
/// On the first row or column the only predecessor is taken.
fn backtrack(acc: &AccumulatedCostMatrix) -> WarpingPath {
    let mut i = acc.rows() - 1;
    let mut j = acc.cols() - 1;
    let mut steps = Vec::with_capacity(i + j + 1);

    loop {
        steps.push(WarpingStep { i, j });
        match (i, j) {
            (0, 0) => break,
            (0, _) => j -= 1,
            (_, 0) => i -= 1,
            _ => {
                let diag = acc.get(i - 1, j - 1);
                let above = acc.get(i - 1, j);
                let left = acc.get(i, j - 1);
                if diag <= above && diag <= left {
                    i -= 1;
                    j -= 1;
                } else if above <= left {
                    i -= 1;
                } else {
                    j -= 1;
                }
            }
        }
    }

    steps.reverse();
    WarpingPath::new(steps)
}
