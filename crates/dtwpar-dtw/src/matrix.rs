//! Dense distance matrix produced by batch DTW.

use std::ops::Index;

use crate::distance::DtwDistance;

/// An `rows x cols` matrix of DTW distances, stored row-major.
///
/// Cell `(i, j)` holds the distance between member `i` of the row collection
/// and member `j` of the column collection. Self comparisons are `n x n`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<DtwDistance>,
}

impl DistanceMatrix {
    /// Create a matrix from row-major data of exactly `rows * cols` distances.
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<DtwDistance>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Return true if the matrix has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return true if the matrix has as many rows as columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Return the distance between row member `i` and column member `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> DtwDistance {
        self[(i, j)]
    }

    /// Return the distances from row member `i` to every column member.
    #[must_use]
    pub fn row(&self, i: usize) -> &[DtwDistance] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over every cell as `(i, j, distance)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, DtwDistance)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(flat, &d)| (flat / self.cols, flat % self.cols, d))
    }

    /// Copy the raw values into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .chunks(self.cols)
            .map(|row| row.iter().map(|d| d.value()).collect())
            .collect()
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = DtwDistance;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i < self.rows, "row index {i} out of bounds for {} rows", self.rows);
        assert!(j < self.cols, "column index {j} out of bounds for {} columns", self.cols);
        &self.data[i * self.cols + j]
    }
}
