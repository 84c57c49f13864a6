//! NumPy `.npy` tensor reader for batch mode.

use std::fs::File;
use std::path::{Path, PathBuf};

use dtwpar_dtw::{Series, SeriesCollection};
use ndarray::{ArrayD, Axis};
use ndarray_npy::ReadNpyExt;
use tracing::{info, instrument};

use crate::IoError;

/// Reads a collection of equal-length series from a `.npy` file.
///
/// Accepted shapes are `(N, T, D)` for `N` series of `T` observations with `D`
/// dimensions, and `(N, T)` for univariate series. The element type must be
/// `f64`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::TensorRead`] | Not a valid `f64` `.npy` file |
/// | [`IoError::TensorRank`] | Rank is neither 2 nor 3 |
/// | [`IoError::EmptyDataset`] | Any axis has length zero |
/// | [`IoError::Series`] | A value is NaN or infinite |
pub struct TensorReader {
    path: PathBuf,
}

impl TensorReader {
    /// Create a new reader for the given `.npy` file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the tensor, returning one series per leading index.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SeriesCollection, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let array = ArrayD::<f64>::read_npy(file).map_err(|e| IoError::TensorRead {
            path: self.path.clone(),
            source: e,
        })?;

        let dims = match array.ndim() {
            2 => 1,
            3 => array.shape()[2],
            rank => {
                return Err(IoError::TensorRank {
                    path: self.path.clone(),
                    rank,
                });
            }
        };
        if array.shape().contains(&0) {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        // Logical iteration order of a (T, D) slice is time-major, which is the
        // row-major layout Series expects.
        let series = array
            .axis_iter(Axis(0))
            .map(|slice| {
                Series::from_flat(slice.iter().copied().collect(), dims).map_err(|source| {
                    IoError::Series {
                        path: self.path.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let collection = SeriesCollection::new(series).map_err(|source| IoError::Series {
            path: self.path.clone(),
            source,
        })?;
        info!(
            n_series = collection.len(),
            n_timesteps = array.shape()[1],
            dims,
            "tensor loaded"
        );
        Ok(collection)
    }
}
