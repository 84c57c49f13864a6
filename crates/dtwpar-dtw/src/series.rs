//! Time series types with declared shape and validation guarantees.

use crate::error::DtwError;

/// Owned, validated time series of `len` observations, each `dims` values wide.
///
/// Values are stored row-major: observation `t` occupies
/// `data[t * dims..(t + 1) * dims]`. Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    data: Vec<f64>,
    dims: usize,
}

impl Series {
    /// Create a univariate series (one value per observation).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `values` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn univariate(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::from_flat(values, 1)
    }

    /// Create a series from a row-major flat buffer with the declared dimensionality.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidDimensionality`] | `dims` is zero |
    /// | [`DtwError::EmptySeries`] | `data` is empty |
    /// | [`DtwError::RaggedObservations`] | `data.len()` is not a multiple of `dims` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_flat(data: Vec<f64>, dims: usize) -> Result<Self, DtwError> {
        if dims == 0 {
            return Err(DtwError::InvalidDimensionality);
        }
        if data.is_empty() {
            return Err(DtwError::EmptySeries);
        }
        if data.len() % dims != 0 {
            return Err(DtwError::RaggedObservations {
                len: data.len(),
                dims,
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        Ok(Self { data, dims })
    }

    /// Create a series from time-major rows, one row per observation.
    ///
    /// # Errors
    ///
    /// Same as [`Series::from_flat`], plus
    /// [`DtwError::InconsistentDimensionLength`] when observations differ in width.
    pub fn from_observations(observations: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let dims = observations.first().map_or(0, Vec::len);
        if observations.is_empty() {
            return Err(DtwError::EmptySeries);
        }
        check_uniform(&observations, dims)?;
        let data = observations.into_iter().flatten().collect();
        Self::from_flat(data, dims)
    }

    /// Create a series from dimension-major rows, one row per axis.
    ///
    /// Row `k` holds the values of dimension `k` for every time step, so all rows
    /// must share one length.
    ///
    /// # Errors
    ///
    /// Same as [`Series::from_flat`], plus
    /// [`DtwError::InconsistentDimensionLength`] when axes differ in length.
    pub fn from_dimensions(dimensions: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let dims = dimensions.len();
        if dims == 0 {
            return Err(DtwError::InvalidDimensionality);
        }
        let len = dimensions[0].len();
        check_uniform(&dimensions, len)?;

        let mut data = Vec::with_capacity(len * dims);
        for t in 0..len {
            data.extend(dimensions.iter().map(|axis| axis[t]));
        }
        Self::from_flat(data, dims)
    }

    /// Borrow this series as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SeriesView<'_> {
        SeriesView {
            data: &self.data,
            dims: self.dims,
        }
    }

    /// Return the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dims
    }

    /// Return true if the series has no observations.
    ///
    /// Always `false` for a constructed [`Series`]; provided to satisfy the
    /// `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the number of values per observation.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Consume and return the row-major flat buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

impl AsRef<[f64]> for Series {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

impl TryFrom<Vec<f64>> for Series {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::univariate(values)
    }
}

fn check_uniform(rows: &[Vec<f64>], expected: usize) -> Result<(), DtwError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(dimension) => Err(DtwError::InconsistentDimensionLength {
            dimension,
            expected,
            got: rows[dimension].len(),
        }),
        None => Ok(()),
    }
}

/// Borrowed view into a validated series. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    data: &'a [f64],
    dims: usize,
}

impl<'a> SeriesView<'a> {
    /// Return observation `t` as a slice of `dims` values.
    ///
    /// # Panics
    ///
    /// Panics if `t >= len()`.
    #[inline]
    #[must_use]
    pub fn observation(&self, t: usize) -> &'a [f64] {
        &self.data[t * self.dims..(t + 1) * self.dims]
    }

    /// Return the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dims
    }

    /// Return true if the view has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the number of values per observation.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Return the underlying row-major slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Project onto dimension `k`, producing a univariate series.
    ///
    /// # Panics
    ///
    /// Panics if `k >= dims()`.
    #[must_use]
    pub fn project(&self, k: usize) -> Series {
        assert!(k < self.dims, "dimension {k} out of range for dimensionality {}", self.dims);
        let data = self.data.iter().skip(k).step_by(self.dims).copied().collect();
        // Projection of a validated view is non-empty and finite.
        Series { data, dims: 1 }
    }
}

/// A non-empty collection of series sharing one dimensionality.
///
/// Member lengths may differ.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCollection {
    series: Vec<Series>,
    dims: usize,
}

impl SeriesCollection {
    /// Create a collection, validating that it is non-empty and uniformly dimensioned.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyCollection`] | `series` is empty |
    /// | [`DtwError::NonUniformCollection`] | A member's dimensionality differs from the first |
    pub fn new(series: Vec<Series>) -> Result<Self, DtwError> {
        let Some(first) = series.first() else {
            return Err(DtwError::EmptyCollection);
        };
        let dims = first.dims();
        if let Some(index) = series.iter().position(|s| s.dims() != dims) {
            return Err(DtwError::NonUniformCollection {
                index,
                expected: dims,
                got: series[index].dims(),
            });
        }
        Ok(Self { series, dims })
    }

    /// Return the number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Return true if the collection holds no series. Always `false` once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Return the shared dimensionality.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Return the member series.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Return member `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    /// Iterate over the members.
    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }
}

impl<'a> IntoIterator for &'a SeriesCollection {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

impl TryFrom<Vec<Series>> for SeriesCollection {
    type Error = DtwError;

    fn try_from(series: Vec<Series>) -> Result<Self, Self::Error> {
        Self::new(series)
    }
}
