//! End-to-end integration tests: input file -> DTW -> JSON/CSV -> deserialize.

use std::fs;
use std::path::Path;

use dtwpar_dtw::{Assembled, MultivariateMode, batch_dtw, pairwise_dtw};
use dtwpar_io::{
    ExperimentName, IoError, PairReader, ResultWriter, Settings, TensorReader, render_json,
};
use ndarray::Array3;
use ndarray_npy::write_npy;
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn univariate_pair_round_trip() {
    // 1. Read pair file
    let pair = PairReader::new(&fixture_path("univariate_pair.csv"), 1)
        .read()
        .expect("fixture should parse");

    // 2. Compare with defaults and keep the trace
    let settings = Settings::default();
    let result = pairwise_dtw(&pair.x, &pair.y, settings.mode(), &settings.metric(), true).unwrap();
    assert_eq!(result.distance().value(), 2.0);

    // 3. Write artifacts
    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("pair_rt".into()).unwrap())
        .unwrap();
    writer.write(&Assembled::from(&result)).unwrap();

    // 4. Deserialize back and verify
    let content: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("pair_rt_dtw.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(content["experiment"], "pair_rt");
    assert_eq!(content["distance"], 2.0);

    let traces = content["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(
        traces[0]["accumulated"],
        serde_json::json!([[1.0, 3.0, 6.0], [1.0, 2.0, 4.0], [2.0, 1.0, 2.0]])
    );
    assert_eq!(
        traces[0]["path"],
        serde_json::json!([[0, 0], [1, 0], [2, 1], [2, 2]])
    );

    let csv = fs::read_to_string(dir.path().join("pair_rt_dtw.csv")).unwrap();
    assert_eq!(csv, "0\n2\n");
}

#[test]
fn multivariate_pair_modes_differ() {
    let pair = PairReader::new(&fixture_path("multivariate_pair.csv"), 2)
        .read()
        .unwrap();
    assert_eq!((pair.x.len(), pair.y.len(), pair.dims()), (3, 2, 2));

    let settings = Settings::default();
    let metric = settings.metric();
    let dependent = pairwise_dtw(&pair.x, &pair.y, MultivariateMode::Dependent, &metric, false)
        .unwrap()
        .distance()
        .value();
    let independent =
        pairwise_dtw(&pair.x, &pair.y, MultivariateMode::Independent, &metric, true).unwrap();

    assert!((dependent - (2.0 + 2f64.sqrt())).abs() < 1e-12, "dependent = {dependent}");
    assert_eq!(independent.distance().value(), 4.0);

    let json: serde_json::Value =
        serde_json::from_str(&render_json(&Assembled::from(&independent)).unwrap()).unwrap();
    let traces = json["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0]["dimension"], 0);
    assert_eq!(traces[1]["dimension"], 1);
}

#[test]
fn jagged_fixture_rejected() {
    let result = PairReader::new(&fixture_path("jagged_pair.csv"), 2).read();
    assert!(matches!(
        result,
        Err(IoError::InconsistentRowLength { row_index: 1, .. })
    ));
}

#[test]
fn tensor_batch_round_trip() {
    let dir = TempDir::new().unwrap();

    // 1. Three univariate series as an (N, T, D) tensor
    let values = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0];
    let tensor = Array3::from_shape_vec((3, 3, 1), values).unwrap();
    let npy = dir.path().join("x.npy");
    write_npy(&npy, &tensor).unwrap();

    // 2. Batch against itself on two workers
    let collection = TensorReader::new(&npy).read().unwrap();
    let settings = Settings {
        n_threads: 2,
        ..Settings::default()
    };
    let matrix = batch_dtw(
        &collection,
        None,
        settings.mode(),
        &settings.metric(),
        settings.n_threads,
    )
    .unwrap();

    // 3. Write and read back
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("tensor".into()).unwrap())
        .unwrap();
    writer.write(&Assembled::from(&matrix)).unwrap();

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(writer.json_path()).unwrap()).unwrap();
    assert_eq!(content["kind"], "matrix");
    assert_eq!(content["shape"], serde_json::json!([3, 3]));
    assert_eq!(
        content["matrix"],
        serde_json::json!([[0.0, 2.0, 0.0], [2.0, 0.0, 2.0], [0.0, 2.0, 0.0]])
    );

    let csv = fs::read_to_string(writer.csv_path()).unwrap();
    assert_eq!(csv, "0,1,2\n0,2,0\n2,0,2\n0,2,0\n");
}

#[test]
fn settings_file_drives_metric_and_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"distance": "cityblock", "dtw_type": "independent"}"#).unwrap();
    let settings = Settings::load(&path).unwrap();

    let pair = PairReader::new(&fixture_path("multivariate_pair.csv"), 2)
        .with_delimiter(settings.delimiter_byte())
        .read()
        .unwrap();
    let result = pairwise_dtw(
        &pair.x,
        &pair.y,
        settings.mode(),
        &settings.metric(),
        settings.visualization,
    )
    .unwrap();
    assert_eq!(result.distance().value(), 4.0);
    assert!(result.trace().is_none());
}
