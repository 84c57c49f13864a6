//! Parallel DTW over every pair drawn from one or two series collections.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, instrument};

use crate::distance::DtwDistance;
use crate::dtw::{Dtw, MultivariateMode};
use crate::error::DtwError;
use crate::matrix::DistanceMatrix;
use crate::metric::PointDistance;
use crate::series::{Series, SeriesCollection, SeriesView};

/// Shared flag asking a running batch to stop.
///
/// Cells that have not started when the flag is raised are skipped; cells
/// already running finish normally. The batch then returns
/// [`DtwError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Visible to every clone of this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Batch DTW evaluator backed by a dedicated worker pool.
///
/// The pool is built once with exactly `workers` threads and reused by every
/// [`run`][BatchDtw::run]. Each cell is one sequential pairwise DTW, so the
/// resulting matrix is bit-identical for any worker count.
#[derive(Debug)]
pub struct BatchDtw<M> {
    dtw: Dtw<M>,
    pool: ThreadPool,
    workers: usize,
    cancel: Option<CancelFlag>,
}

impl<M: PointDistance> BatchDtw<M> {
    /// Create a batch evaluator running `dtw` on `workers` threads.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWorkerCount`] | `workers` is zero |
    /// | [`DtwError::ThreadPool`] | The operating system refused to spawn the workers |
    pub fn new(dtw: Dtw<M>, workers: usize) -> Result<Self, DtwError> {
        if workers == 0 {
            return Err(DtwError::InvalidWorkerCount { workers });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dtwpar-worker-{i}"))
            .build()?;
        debug!(workers, "batch worker pool ready");
        Ok(Self {
            dtw,
            pool,
            workers,
            cancel: None,
        })
    }

    /// Attach a cancellation flag checked before each cell starts.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Return the number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Return the pairwise DTW configuration.
    #[must_use]
    pub fn dtw(&self) -> &Dtw<M> {
        &self.dtw
    }

    /// Compute the distance matrix between `rows` and `cols`.
    ///
    /// With `cols = None` the collection is compared against itself, giving an
    /// `n x n` matrix. Every cell, diagonal included, is computed by
    /// [`Dtw::distance`], so it matches a direct pairwise call exactly.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ShapeMismatch`] | The collections differ in dimensionality; reported at pair `(0, 0)` before any work |
    /// | [`DtwError::PairFailed`] | A cell failed; the lowest row-major cell is reported |
    /// | [`DtwError::Cancelled`] | The attached [`CancelFlag`] was raised |
    #[instrument(skip_all, fields(rows = rows.len(), cols = cols.map_or(rows.len(), SeriesCollection::len), workers = self.workers))]
    pub fn run(
        &self,
        rows: &SeriesCollection,
        cols: Option<&SeriesCollection>,
    ) -> Result<DistanceMatrix, DtwError> {
        let cols = cols.unwrap_or(rows);
        if rows.dims() != cols.dims() {
            return Err(DtwError::ShapeMismatch {
                row: 0,
                col: 0,
                left: rows.dims(),
                right: cols.dims(),
            });
        }

        let row_views: Vec<SeriesView<'_>> = rows.iter().map(Series::as_view).collect();
        let col_views: Vec<SeriesView<'_>> = cols.iter().map(Series::as_view).collect();
        let (n_rows, n_cols) = (row_views.len(), col_views.len());
        let cancel = self.cancel.as_ref();

        // Indexed collect keeps each cell at its row-major position regardless of
        // which worker finishes first. Cells past the lowest known failure are
        // skipped; the lowest failing cell itself is never skipped.
        let first_failure = AtomicUsize::new(usize::MAX);
        let cells: Vec<Option<Result<DtwDistance, DtwError>>> = self.pool.install(|| {
            (0..n_rows * n_cols)
                .into_par_iter()
                .map(|flat| {
                    if cancel.is_some_and(CancelFlag::is_cancelled)
                        || flat > first_failure.load(Ordering::Relaxed)
                    {
                        return None;
                    }
                    let cell = self.dtw.distance(row_views[flat / n_cols], col_views[flat % n_cols]);
                    if cell.is_err() {
                        first_failure.fetch_min(flat, Ordering::Relaxed);
                    }
                    Some(cell)
                })
                .collect()
        });

        if cancel.is_some_and(CancelFlag::is_cancelled) {
            info!("batch cancelled");
            return Err(DtwError::Cancelled);
        }

        let mut data = Vec::with_capacity(cells.len());
        for (flat, cell) in cells.into_iter().enumerate() {
            match cell {
                Some(Ok(distance)) => data.push(distance),
                Some(Err(source)) => {
                    debug!(flat, "stopping at first failing cell");
                    return Err(DtwError::PairFailed {
                        row: flat / n_cols,
                        col: flat % n_cols,
                        source: Box::new(source),
                    });
                }
                // Only cancellation skips a cell with no failure before it.
                None => return Err(DtwError::Cancelled),
            }
        }

        info!(cells = data.len(), "batch complete");
        Ok(DistanceMatrix::from_raw(n_rows, n_cols, data))
    }
}

/// Compute the DTW distance matrix of `rows` against `cols` (or against itself).
///
/// Builds a pool of `workers` threads for this call; reuse a [`BatchDtw`] to
/// amortize the pool across calls.
///
/// # Errors
///
/// See [`BatchDtw::new`] and [`BatchDtw::run`].
pub fn batch_dtw<M: PointDistance + ?Sized>(
    rows: &SeriesCollection,
    cols: Option<&SeriesCollection>,
    mode: MultivariateMode,
    metric: &M,
    workers: usize,
) -> Result<DistanceMatrix, DtwError> {
    BatchDtw::new(Dtw::new(metric).with_mode(mode), workers)?.run(rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::pairwise_dtw;
    use crate::metric::{Euclidean, MetricFn};

    fn collection(series: &[&[f64]]) -> SeriesCollection {
        SeriesCollection::new(
            series
                .iter()
                .map(|s| Series::univariate(s.to_vec()).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn cells_match_pairwise() {
        let a = collection(&[&[1.0, 2.0, 3.0], &[4.0, 5.0], &[1.0, 3.0, 2.0, 0.0]]);
        let b = collection(&[&[0.0, 1.0], &[2.0, 2.0, 2.0]]);
        let matrix = batch_dtw(&a, Some(&b), MultivariateMode::Dependent, &Euclidean, 2).unwrap();
        assert_eq!((matrix.rows(), matrix.cols()), (3, 2));
        for (i, j, d) in matrix.iter() {
            let direct = pairwise_dtw(
                &a.series()[i],
                &b.series()[j],
                MultivariateMode::Dependent,
                &Euclidean,
                false,
            )
            .unwrap();
            assert_eq!(d.value().to_bits(), direct.distance().value().to_bits());
        }
    }

    #[test]
    fn self_comparison_is_symmetric_with_zero_diagonal() {
        let a = collection(&[&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0], &[1.0, 1.0, 1.0], &[0.0, 5.0, 0.0]]);
        let matrix = batch_dtw(&a, None, MultivariateMode::Dependent, &Euclidean, 3).unwrap();
        assert!(matrix.is_square());
        for i in 0..4 {
            assert_eq!(matrix.get(i, i).value(), 0.0);
            for j in 0..4 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i), "asymmetry at ({i}, {j})");
            }
        }
    }

    #[test]
    fn one_and_four_workers_agree() {
        let a = collection(&[&[1.0, 2.0, 3.0], &[2.0, 0.5, 4.0]]);
        let single = batch_dtw(&a, None, MultivariateMode::Dependent, &Euclidean, 1).unwrap();
        let four = batch_dtw(&a, None, MultivariateMode::Dependent, &Euclidean, 4).unwrap();
        assert_eq!(single, four);
    }

    #[test]
    fn zero_workers_rejected() {
        let result = BatchDtw::new(Dtw::new(Euclidean), 0);
        assert!(matches!(result, Err(DtwError::InvalidWorkerCount { workers: 0 })));
    }

    #[test]
    fn dimensionality_mismatch_between_collections() {
        let a = collection(&[&[1.0, 2.0]]);
        let b = SeriesCollection::new(vec![Series::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap()])
            .unwrap();
        let result = batch_dtw(&a, Some(&b), MultivariateMode::Dependent, &Euclidean, 1);
        assert!(matches!(
            result,
            Err(DtwError::ShapeMismatch { row: 0, col: 0, left: 1, right: 2 })
        ));
    }

    #[test]
    fn first_failing_cell_is_reported() {
        let a = collection(&[&[1.0, 2.0], &[60.0, 1.0], &[70.0]]);
        let metric = MetricFn(|u: &[f64], v: &[f64]| {
            if u[0] > 50.0 { f64::NAN } else { (u[0] - v[0]).abs() }
        });
        let result = batch_dtw(&a, None, MultivariateMode::Dependent, &metric, 4);
        match result {
            Err(DtwError::PairFailed { row, col, source }) => {
                assert_eq!((row, col), (1, 0));
                assert!(matches!(*source, DtwError::MetricFailure { i: 0, .. }));
            }
            other => panic!("expected PairFailed, got {other:?}"),
        }
    }

    #[test]
    fn raised_flag_cancels_batch() {
        let a = collection(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let flag = CancelFlag::new();
        let batch = BatchDtw::new(Dtw::new(Euclidean), 2)
            .unwrap()
            .with_cancel(flag.clone());

        assert!(batch.run(&a, None).is_ok());
        flag.cancel();
        assert!(matches!(batch.run(&a, None), Err(DtwError::Cancelled)));
    }

    #[test]
    fn failure_stops_remaining_cells() {
        let series: Vec<Vec<f64>> = (0..20)
            .map(|i| if i == 0 { vec![60.0; 5] } else { vec![f64::from(i); 5] })
            .collect();
        let refs: Vec<&[f64]> = series.iter().map(Vec::as_slice).collect();
        let a = collection(&refs);

        let calls = AtomicUsize::new(0);
        let metric = MetricFn(|u: &[f64], v: &[f64]| {
            calls.fetch_add(1, Ordering::Relaxed);
            if u[0] > 50.0 { f64::NAN } else { (u[0] - v[0]).abs() }
        });
        let batch = BatchDtw::new(Dtw::new(&metric), 1).unwrap();
        match batch.run(&a, None) {
            Err(DtwError::PairFailed { row: 0, col: 0, .. }) => {}
            other => panic!("expected PairFailed at (0, 0), got {other:?}"),
        }
        // A full run would evaluate 400 cells of 25 point distances each.
        let calls = calls.load(Ordering::Relaxed);
        assert!(calls < 25, "{calls} point distances evaluated after the first failure");
    }

    #[test]
    fn lowest_failure_wins_across_workers() {
        // Rows 1 and 3 fail; whichever worker sees row 3 first, row 1 is reported.
        let a = collection(&[&[1.0, 2.0], &[60.0], &[3.0, 4.0], &[70.0], &[5.0]]);
        let metric = MetricFn(|u: &[f64], v: &[f64]| {
            if u[0] > 50.0 { f64::NAN } else { (u[0] - v[0]).abs() }
        });
        for workers in [1, 2, 4] {
            match batch_dtw(&a, None, MultivariateMode::Dependent, &metric, workers) {
                Err(DtwError::PairFailed { row, col, .. }) => assert_eq!((row, col), (1, 0)),
                other => panic!("expected PairFailed, got {other:?}"),
            }
        }
    }

    #[test]
    fn flag_raised_mid_batch_cancels() {
        let a = collection(&[&[1.0, 2.0, 3.0], &[2.0, 3.0], &[4.0], &[0.0, 1.0]]);
        let flag = CancelFlag::new();
        let raiser = flag.clone();
        let metric = MetricFn(move |u: &[f64], v: &[f64]| {
            raiser.cancel();
            (u[0] - v[0]).abs()
        });
        let batch = BatchDtw::new(Dtw::new(metric), 1)
            .unwrap()
            .with_cancel(flag.clone());

        let result = batch.run(&a, None);
        assert!(flag.is_cancelled());
        assert!(matches!(result, Err(DtwError::Cancelled)), "got {result:?}");
    }

    #[test]
    fn pool_is_reused_across_runs() {
        let a = collection(&[&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]]);
        let batch = BatchDtw::new(Dtw::new(Euclidean), 2).unwrap();
        assert_eq!(batch.workers(), 2);
        let first = batch.run(&a, None).unwrap();
        let second = batch.run(&a, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get(0, 1).value(), 2.0);
    }
}
