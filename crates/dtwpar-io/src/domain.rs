//! Domain types for dtwpar-io.

use dtwpar_dtw::Series;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two series read from a pair file.
///
/// Produced by [`PairReader`](crate::PairReader). Both series share the
/// declared dimensionality; their lengths may differ.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPair {
    /// The first series (the leading half of the records).
    pub x: Series,
    /// The second series (the trailing half of the records).
    pub y: Series,
}

impl SeriesPair {
    /// Return the shared dimensionality.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.x.dims()
    }
}
