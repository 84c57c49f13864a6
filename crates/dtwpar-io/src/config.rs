//! JSON settings file and metric name resolution.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use dtwpar_dtw::{
    Chebyshev, Euclidean, Manhattan, Minkowski, MultivariateMode, PointDistance, SquaredEuclidean,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Name of a supported point distance, as written in settings and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricName {
    /// L2 norm of the difference.
    #[default]
    Euclidean,
    /// Squared L2 norm.
    #[serde(alias = "squared_euclidean")]
    SqEuclidean,
    /// L1 norm, also accepted as `manhattan`.
    #[serde(alias = "manhattan")]
    Cityblock,
    /// L-infinity norm.
    Chebyshev,
    /// Lp norm of order `minkowski_p`.
    Minkowski,
}

impl MetricName {
    /// Return the canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SqEuclidean => "sqeuclidean",
            Self::Cityblock => "cityblock",
            Self::Chebyshev => "chebyshev",
            Self::Minkowski => "minkowski",
        }
    }

    /// Resolve to a concrete point distance. `p` is used only by Minkowski.
    #[must_use]
    pub fn resolve(self, p: f64) -> NamedMetric {
        match self {
            Self::Euclidean => NamedMetric::Euclidean(Euclidean),
            Self::SqEuclidean => NamedMetric::SqEuclidean(SquaredEuclidean),
            Self::Cityblock => NamedMetric::Cityblock(Manhattan),
            Self::Chebyshev => NamedMetric::Chebyshev(Chebyshev),
            Self::Minkowski => NamedMetric::Minkowski(Minkowski::new(p)),
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Self::Euclidean),
            "sqeuclidean" | "squared_euclidean" => Ok(Self::SqEuclidean),
            "cityblock" | "manhattan" => Ok(Self::Cityblock),
            "chebyshev" => Ok(Self::Chebyshev),
            "minkowski" => Ok(Self::Minkowski),
            _ => Err(IoError::UnknownMetric {
                name: s.to_string(),
            }),
        }
    }
}

/// A point distance selected by name, dispatched statically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NamedMetric {
    /// See [`Euclidean`].
    Euclidean(Euclidean),
    /// See [`SquaredEuclidean`].
    SqEuclidean(SquaredEuclidean),
    /// See [`Manhattan`].
    Cityblock(Manhattan),
    /// See [`Chebyshev`].
    Chebyshev(Chebyshev),
    /// See [`Minkowski`].
    Minkowski(Minkowski),
}

impl PointDistance for NamedMetric {
    #[inline]
    fn distance(&self, u: &[f64], v: &[f64]) -> f64 {
        match self {
            Self::Euclidean(m) => m.distance(u, v),
            Self::SqEuclidean(m) => m.distance(u, v),
            Self::Cityblock(m) => m.distance(u, v),
            Self::Chebyshev(m) => m.distance(u, v),
            Self::Minkowski(m) => m.distance(u, v),
        }
    }
}

/// How multivariate series are aligned; `d` and `i` are accepted as short forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtwType {
    /// One shared warping path.
    #[default]
    #[serde(alias = "d")]
    Dependent,
    /// One warping path per dimension.
    #[serde(alias = "i")]
    Independent,
}

impl From<DtwType> for MultivariateMode {
    fn from(value: DtwType) -> Self {
        match value {
            DtwType::Dependent => Self::Dependent,
            DtwType::Independent => Self::Independent,
        }
    }
}

impl FromStr for DtwType {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "dependent" => Ok(Self::Dependent),
            "i" | "independent" => Ok(Self::Independent),
            _ => Err(IoError::UnknownDtwType {
                name: s.to_string(),
            }),
        }
    }
}

/// Run settings loaded from a JSON file.
///
/// Missing fields take their defaults, so `{}` is a valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Point distance name.
    pub distance: MetricName,
    /// Order of the Minkowski distance; ignored by other metrics.
    pub minkowski_p: f64,
    /// Multivariate alignment mode.
    pub dtw_type: DtwType,
    /// Retain cost grids and warping paths for pairwise comparisons.
    pub visualization: bool,
    /// Worker threads for batch mode.
    pub n_threads: usize,
    /// Log verbosity: 0 info, 1 debug, 2 or more trace.
    pub verbose: u8,
    /// Write result files in addition to printing to stdout.
    pub output_file: bool,
    /// Field separator of pair files.
    pub delimiter: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distance: MetricName::Euclidean,
            minkowski_p: 2.0,
            dtw_type: DtwType::Dependent,
            visualization: false,
            n_threads: 1,
            verbose: 0,
            output_file: false,
            delimiter: ';',
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::ConfigParse`] | Invalid JSON, unknown field, or unknown enum value |
    /// | [`IoError::InvalidSetting`] | A value fails [`validate`](Settings::validate) |
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let text = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Self = serde_json::from_str(&text).map_err(|e| IoError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Write the default settings to `path`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ConfigExists`] | `path` already exists |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_default(path: &Path) -> Result<(), IoError> {
        if path.exists() {
            return Err(IoError::ConfigExists {
                path: path.to_path_buf(),
            });
        }
        let json = serde_json::to_string_pretty(&Self::default())?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("default settings written");
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidSetting`] when `n_threads` is zero, when
    /// `minkowski_p` is not a finite number `>= 1` for the Minkowski metric,
    /// or when `delimiter` is not a single ASCII character.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.n_threads == 0 {
            return Err(IoError::InvalidSetting {
                field: "n_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.distance == MetricName::Minkowski
            && !(self.minkowski_p.is_finite() && self.minkowski_p >= 1.0)
        {
            return Err(IoError::InvalidSetting {
                field: "minkowski_p",
                reason: format!("must be a finite number >= 1, got {}", self.minkowski_p),
            });
        }
        if !self.delimiter.is_ascii() {
            return Err(IoError::InvalidSetting {
                field: "delimiter",
                reason: format!("must be an ASCII character, got {:?}", self.delimiter),
            });
        }
        Ok(())
    }

    /// Return the configured point distance.
    #[must_use]
    pub fn metric(&self) -> NamedMetric {
        self.distance.resolve(self.minkowski_p)
    }

    /// Return the configured multivariate mode.
    #[must_use]
    pub fn mode(&self) -> MultivariateMode {
        self.dtw_type.into()
    }

    /// Return the delimiter as a byte. Valid after [`validate`](Settings::validate).
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }
}
