//! Caller-facing shapes for pairwise and batch results.

use crate::dtw::DtwResult;
use crate::matrix::DistanceMatrix;
use crate::trace::DimensionTrace;

/// One alignment trace flattened into plain nested vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceBundle {
    /// Projected dimension, `None` for a dependent-mode alignment.
    pub dimension: Option<usize>,
    /// Pointwise cost grid, one inner vector per row.
    pub cost: Vec<Vec<f64>>,
    /// Accumulated cost grid, one inner vector per row.
    pub accumulated: Vec<Vec<f64>>,
    /// Warping path as `(i, j)` pairs from `(0, 0)` to `(n-1, m-1)`.
    pub path: Vec<(usize, usize)>,
}

impl From<&DimensionTrace> for TraceBundle {
    fn from(trace: &DimensionTrace) -> Self {
        Self {
            dimension: trace.dimension(),
            cost: trace.cost().to_rows(),
            accumulated: trace.accumulated().to_rows(),
            path: trace.path().to_pairs(),
        }
    }
}

/// A result normalized for output, independent of any presentation format.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    /// A single pairwise distance.
    Scalar {
        /// The DTW distance.
        distance: f64,
    },
    /// A pairwise distance with its alignment traces.
    Traced {
        /// The DTW distance.
        distance: f64,
        /// One bundle per alignment (one per dimension in independent mode).
        dimensions: Vec<TraceBundle>,
    },
    /// A batch distance matrix.
    Grid {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
        /// Distances, one inner vector per row.
        values: Vec<Vec<f64>>,
    },
}

impl Assembled {
    /// Return the scalar distance for pairwise results, `None` for grids.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        match self {
            Self::Scalar { distance } | Self::Traced { distance, .. } => Some(*distance),
            Self::Grid { .. } => None,
        }
    }
}

impl From<&DtwResult> for Assembled {
    fn from(result: &DtwResult) -> Self {
        let distance = result.distance().value();
        match result.trace() {
            Some(trace) => Self::Traced {
                distance,
                dimensions: trace.dimensions().iter().map(TraceBundle::from).collect(),
            },
            None => Self::Scalar { distance },
        }
    }
}

impl From<DtwResult> for Assembled {
    fn from(result: DtwResult) -> Self {
        Self::from(&result)
    }
}

impl From<&DistanceMatrix> for Assembled {
    fn from(matrix: &DistanceMatrix) -> Self {
        Self::Grid {
            rows: matrix.rows(),
            cols: matrix.cols(),
            values: matrix.to_rows(),
        }
    }
}

impl From<DistanceMatrix> for Assembled {
    fn from(matrix: DistanceMatrix) -> Self {
        Self::from(&matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::batch_dtw;
    use crate::dtw::{MultivariateMode, pairwise_dtw};
    use crate::metric::Euclidean;
    use crate::series::{Series, SeriesCollection};

    #[test]
    fn scalar_without_trace() {
        let x = Series::univariate(vec![1.0, 2.0, 3.0]).unwrap();
        let y = Series::univariate(vec![2.0, 3.0, 4.0]).unwrap();
        let result = pairwise_dtw(&x, &y, MultivariateMode::Dependent, &Euclidean, false).unwrap();
        assert_eq!(Assembled::from(result), Assembled::Scalar { distance: 2.0 });
    }

    #[test]
    fn traced_bundles_per_dimension() {
        let x = Series::from_dimensions(vec![vec![1.0, 2.0], vec![0.0, 1.0]]).unwrap();
        let result = pairwise_dtw(&x, &x, MultivariateMode::Independent, &Euclidean, true).unwrap();
        let Assembled::Traced { distance, dimensions } = Assembled::from(&result) else {
            panic!("expected traced result");
        };
        assert_eq!(distance, 0.0);
        assert_eq!(dimensions.len(), 2);
        assert_eq!(dimensions[1].dimension, Some(1));
        assert_eq!(dimensions[0].path, vec![(0, 0), (1, 1)]);
        assert_eq!(dimensions[0].cost, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn grid_from_matrix() {
        let a = SeriesCollection::new(vec![
            Series::univariate(vec![0.0]).unwrap(),
            Series::univariate(vec![3.0]).unwrap(),
        ])
        .unwrap();
        let matrix = batch_dtw(&a, None, MultivariateMode::Dependent, &Euclidean, 1).unwrap();
        let assembled = Assembled::from(&matrix);
        assert_eq!(assembled.distance(), None);
        assert_eq!(
            assembled,
            Assembled::Grid {
                rows: 2,
                cols: 2,
                values: vec![vec![0.0, 3.0], vec![3.0, 0.0]],
            }
        );
    }
}
