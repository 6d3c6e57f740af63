//! Tests for loading inference artifacts from disk.

use approx::assert_relative_eq;
use cytoscan_common::catalog::FEATURE_COUNT;
use cytoscan_common::{ArtifactError, InferenceAdapter, InferenceError};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write_artifacts(dir: &TempDir, scaler: serde_json::Value, model: serde_json::Value) {
    fs::write(dir.path().join("scaler.json"), scaler.to_string()).unwrap();
    fs::write(dir.path().join("model.json"), model.to_string()).unwrap();
}

fn load(dir: &TempDir) -> Result<InferenceAdapter, ArtifactError> {
    InferenceAdapter::load(&dir.path().join("scaler.json"), &dir.path().join("model.json"))
}

/// Logistic model whose logit is the sum of the scaled inputs
fn logistic_model(dim: usize) -> serde_json::Value {
    json!({
        "layers": [
            { "weights": [vec![1.0; dim]], "bias": [0.0], "activation": "sigmoid" }
        ]
    })
}

#[test]
fn test_load_valid_artifacts() {
    let dir = TempDir::new().unwrap();
    write_artifacts(
        &dir,
        json!({ "mean": vec![1.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] }),
        logistic_model(FEATURE_COUNT),
    );
    let adapter = load(&dir).unwrap();
    assert_eq!(adapter.input_dim(), FEATURE_COUNT);

    // Inputs equal the mean, so the logit is zero
    let p = adapter.predict(&vec![1.0; FEATURE_COUNT]).unwrap();
    assert_relative_eq!(p, 0.5);
}

#[test]
fn test_predict_dimension_mismatch_is_distinct() {
    let dir = TempDir::new().unwrap();
    write_artifacts(
        &dir,
        json!({ "mean": vec![0.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] }),
        logistic_model(FEATURE_COUNT),
    );
    let adapter = load(&dir).unwrap();
    assert_eq!(
        adapter.predict(&[0.0; 29]),
        Err(InferenceError::DimensionMismatch {
            expected: FEATURE_COUNT,
            actual: 29
        })
    );
}

#[test]
fn test_scaler_and_model_disagree() {
    let dir = TempDir::new().unwrap();
    write_artifacts(
        &dir,
        json!({ "mean": vec![0.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] }),
        logistic_model(10),
    );
    assert!(matches!(load(&dir), Err(ArtifactError::Shape(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(load(&dir), Err(ArtifactError::Io { .. })));
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scaler.json"), "not json").unwrap();
    fs::write(dir.path().join("model.json"), "{}").unwrap();
    assert!(matches!(load(&dir), Err(ArtifactError::Parse { .. })));
}

#[test]
fn test_hidden_layer_network() {
    let dir = TempDir::new().unwrap();
    let mut first_row = vec![0.0; 4];
    first_row[0] = 1.0;
    write_artifacts(
        &dir,
        json!({ "mean": [0.0, 0.0, 0.0, 0.0], "scale": [2.0, 1.0, 1.0, 1.0] }),
        json!({
            "layers": [
                {
                    "weights": [first_row, [0.0, 1.0, 0.0, 0.0]],
                    "bias": [0.0, 0.0],
                    "activation": "relu"
                },
                { "weights": [[1.0, -1.0]], "bias": [0.0], "activation": "sigmoid" }
            ]
        }),
    );
    let adapter = load(&dir).unwrap();
    // scaled = [2, 2, 0, 0]; hidden = [2, 2]; logit = 0
    let p = adapter.predict(&[4.0, 2.0, 9.0, 9.0]).unwrap();
    assert_relative_eq!(p, 0.5);
}

#[test]
fn test_model_with_empty_output_layer_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_artifacts(
        &dir,
        json!({ "mean": [0.0], "scale": [1.0] }),
        json!({
            "layers": [
                { "weights": [[1.0]], "bias": [1.0], "activation": "relu" },
                { "weights": [], "bias": [], "activation": "sigmoid" }
            ]
        }),
    );
    match load(&dir) {
        Err(ArtifactError::Parse { source, .. }) => {
            assert!(source.to_string().contains("layer 1"));
        }
        other => panic!("expected a rejected model, got {:?}", other),
    }
}
