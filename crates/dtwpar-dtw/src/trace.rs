//! Alignment traces retained for visualization.

use crate::grid::{AccumulatedCostMatrix, CostMatrix};
use crate::path::WarpingPath;

/// Cost grid, accumulated grid and warping path of one alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionTrace {
    dimension: Option<usize>,
    cost: CostMatrix,
    accumulated: AccumulatedCostMatrix,
    path: WarpingPath,
}

impl DimensionTrace {
    /// Return the projected dimension, or `None` for a dependent-mode alignment
    /// over full observations.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Return the pointwise cost grid.
    #[must_use]
    pub fn cost(&self) -> &CostMatrix {
        &self.cost
    }

    /// Return the accumulated cost grid.
    #[must_use]
    pub fn accumulated(&self) -> &AccumulatedCostMatrix {
        &self.accumulated
    }

    /// Return the optimal warping path.
    #[must_use]
    pub fn path(&self) -> &WarpingPath {
        &self.path
    }
}

/// All alignment traces of one pairwise comparison.
///
/// Dependent mode yields one trace; independent mode yields one per dimension,
/// in ascending dimension order.
#[derive(Debug, Clone, PartialEq)]
pub struct DtwTrace {
    dimensions: Vec<DimensionTrace>,
}

impl DtwTrace {
    /// Return the per-alignment traces.
    #[must_use]
    pub fn dimensions(&self) -> &[DimensionTrace] {
        &self.dimensions
    }

    /// Return the number of traces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Return true if the trace holds no alignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

/// Collects finished alignments into a [`DtwTrace`] without recomputing anything.
#[derive(Debug, Default)]
pub(crate) struct TraceBuilder {
    dimensions: Vec<DimensionTrace>,
}

impl TraceBuilder {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            dimensions: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(
        &mut self,
        dimension: Option<usize>,
        cost: CostMatrix,
        accumulated: AccumulatedCostMatrix,
        path: WarpingPath,
    ) {
        debug_assert_eq!(cost.rows(), accumulated.rows());
        debug_assert_eq!(cost.cols(), accumulated.cols());
        self.dimensions.push(DimensionTrace {
            dimension,
            cost,
            accumulated,
            path,
        });
    }

    pub(crate) fn build(self) -> DtwTrace {
        DtwTrace {
            dimensions: self.dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::path::WarpingStep;

    #[test]
    fn builder_preserves_push_order() {
        let mut builder = TraceBuilder::with_capacity(2);
        for k in 0..2 {
            let cost = Grid::from_raw(1, 1, vec![k as f64]);
            let acc = cost.clone();
            let path = WarpingPath::new(vec![WarpingStep { i: 0, j: 0 }]);
            builder.push(Some(k), cost, acc, path);
        }
        let trace = builder.build();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.dimensions()[0].dimension(), Some(0));
        assert_eq!(trace.dimensions()[1].dimension(), Some(1));
        assert_eq!(trace.dimensions()[1].cost().get(0, 0), 1.0);
    }
}
