//! File I/O, settings, and serialization for the dtwpar command line.

mod config;
mod domain;
mod error;
mod reader;
mod tensor;
mod writer;

pub use config::{DtwType, MetricName, NamedMetric, Settings};
pub use domain::{ExperimentName, SeriesPair};
pub use error::IoError;
pub use reader::PairReader;
pub use tensor::TensorReader;
pub use writer::{ResultWriter, render_json};
