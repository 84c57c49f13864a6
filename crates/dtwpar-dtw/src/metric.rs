//! Point distances between two observations of equal dimensionality.

/// A scalar distance between two observations.
///
/// Implementations must be pure: the same inputs always give the same output
/// and no state is mutated, so one metric can be shared by every batch worker.
/// Both slices always have the same length. The DTW engine checks every
/// returned value and rejects negative, NaN, and infinite results.
pub trait PointDistance: Send + Sync {
    /// Return the distance between observations `u` and `v`.
    fn distance(&self, u: &[f64], v: &[f64]) -> f64;
}

impl<M: PointDistance + ?Sized> PointDistance for &M {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        (**self).distance(u, v)
    }
}

impl<M: PointDistance + ?Sized> PointDistance for Box<M> {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        (**self).distance(u, v)
    }
}

/// Euclidean (L2) distance. For univariate observations this is `|u - v|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl PointDistance for Euclidean {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        SquaredEuclidean.distance(u, v).sqrt()
    }
}

/// Squared Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredEuclidean;

impl PointDistance for SquaredEuclidean {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        debug_assert_eq!(u.len(), v.len());
        u.iter().zip(v).map(|(a, b)| (a - b) * (a - b)).sum()
    }
}

/// Manhattan (L1, city block) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl PointDistance for Manhattan {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        debug_assert_eq!(u.len(), v.len());
        u.iter().zip(v).map(|(a, b)| (a - b).abs()).sum()
    }
}

/// Chebyshev (L-infinity) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chebyshev;

impl PointDistance for Chebyshev {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        debug_assert_eq!(u.len(), v.len());
        u.iter().zip(v).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max)
    }
}

/// Minkowski distance of order `p`.
///
/// `p = 1` is [`Manhattan`], `p = 2` is [`Euclidean`]. A non-positive or
/// non-finite `p` yields non-finite distances, which the engine reports as
/// [`DtwError::MetricFailure`](crate::DtwError::MetricFailure).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minkowski {
    /// Order of the norm.
    pub p: f64,
}

impl Minkowski {
    /// Create a Minkowski distance of order `p`.
    #[must_use]
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl PointDistance for Minkowski {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        debug_assert_eq!(u.len(), v.len());
        let sum: f64 = u.iter().zip(v).map(|(a, b)| (a - b).abs().powf(self.p)).sum();
        sum.powf(self.p.recip())
    }
}

/// Adapts a plain function or closure into a [`PointDistance`].
///
/// ```
/// use dtwpar_dtw::{MetricFn, PointDistance};
///
/// let abs_diff = MetricFn(|u: &[f64], v: &[f64]| (u[0] - v[0]).abs());
/// assert_eq!(abs_diff.distance(&[1.0], &[4.0]), 3.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MetricFn<F>(pub F);

impl<F> PointDistance for MetricFn<F>
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        (self.0)(u, v)
    }
}
