//! JSON and CSV result writer for pairwise and batch outputs.

use std::fs;
use std::path::{Path, PathBuf};

use dtwpar_dtw::{Assembled, TraceBundle};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes assembled DTW results to files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_dtw.json` and `{experiment}_dtw.csv`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the JSON result file.
    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_dtw.json", self.experiment.as_str()))
    }

    /// Return the path of the CSV result file.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_dtw.csv", self.experiment.as_str()))
    }

    /// Write `result` to both the JSON and the CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] or [`IoError::CsvWrite`] if a file cannot
    /// be written.
    #[instrument(skip_all)]
    pub fn write(&self, result: &Assembled) -> Result<(), IoError> {
        self.write_json(result)?;
        self.write_csv(result)
    }

    /// Write `result` to `{experiment}_dtw.json`, traces included.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_json(&self, result: &Assembled) -> Result<(), IoError> {
        let path = self.json_path();
        let artifact = DtwArtifact::new(Some(self.experiment.as_str()), result);
        let json = serde_json::to_string_pretty(&artifact)?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "JSON result written");
        Ok(())
    }

    /// Write the distance (or distance matrix) to `{experiment}_dtw.csv`.
    ///
    /// The header row holds zero-based column indices; a pairwise result is a
    /// single `0` column with one row. Traces are not written to CSV.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CsvWrite`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_csv(&self, result: &Assembled) -> Result<(), IoError> {
        let path = self.csv_path();
        let csv_err = |e: csv::Error| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        match result {
            Assembled::Scalar { distance } | Assembled::Traced { distance, .. } => {
                wtr.write_record(["0"]).map_err(csv_err)?;
                wtr.write_record([distance.to_string()]).map_err(csv_err)?;
            }
            Assembled::Grid { cols, values, .. } => {
                wtr.write_record((0..*cols).map(|j| j.to_string()))
                    .map_err(csv_err)?;
                for row in values {
                    wtr.write_record(row.iter().map(f64::to_string))
                        .map_err(csv_err)?;
                }
            }
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "CSV result written");
        Ok(())
    }
}

/// Render `result` as pretty-printed JSON, as printed on standard output.
///
/// # Errors
///
/// Returns [`IoError::Serialize`] if serialization fails.
pub fn render_json(result: &Assembled) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(&DtwArtifact::new(None, result))?)
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct DtwArtifact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    experiment: Option<&'a str>,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<&'a [Vec<f64>]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    traces: Option<Vec<TraceEntry<'a>>>,
}

impl<'a> DtwArtifact<'a> {
    fn new(experiment: Option<&'a str>, result: &'a Assembled) -> Self {
        match result {
            Assembled::Scalar { distance } => Self {
                experiment,
                kind: "pairwise",
                distance: Some(*distance),
                shape: None,
                matrix: None,
                traces: None,
            },
            Assembled::Traced {
                distance,
                dimensions,
            } => Self {
                experiment,
                kind: "pairwise",
                distance: Some(*distance),
                shape: None,
                matrix: None,
                traces: Some(dimensions.iter().map(TraceEntry::from).collect()),
            },
            Assembled::Grid { rows, cols, values } => Self {
                experiment,
                kind: "matrix",
                distance: None,
                shape: Some([*rows, *cols]),
                matrix: Some(values.as_slice()),
                traces: None,
            },
        }
    }
}

#[derive(Serialize)]
struct TraceEntry<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<usize>,
    cost: &'a [Vec<f64>],
    accumulated: &'a [Vec<f64>],
    path: &'a [(usize, usize)],
}

impl<'a> From<&'a TraceBundle> for TraceEntry<'a> {
    fn from(bundle: &'a TraceBundle) -> Self {
        Self {
            dimension: bundle.dimension,
            cost: &bundle.cost,
            accumulated: &bundle.accumulated,
            path: &bundle.path,
        }
    }
}
