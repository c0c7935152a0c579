//! A production slot that exists but cannot be used (corrupt payload or a
//! model trained against a different transform version) collapses to "no
//! baseline" instead of failing the cycle.

use std::fs;

use mgate_model::{ModelArtifact, MODEL_SCHEMA_VERSION};
use mgate_promotion::{
    DataIngestionArtifact, ModelEvaluation, ModelEvaluationConfig, ModelTrainerArtifact,
};
use mgate_store::{LocalStore, ObjectStore};

fn threshold_model() -> ModelArtifact {
    ModelArtifact {
        schema_version: MODEL_SCHEMA_VERSION,
        transform_version: 1,
        feature_names: vec!["x".to_string()],
        weights: vec![1.0],
        bias: 0.0,
        threshold: 0.5,
    }
}

fn evaluation_fixture(
    dir: &std::path::Path,
    store: &LocalStore,
) -> (DataIngestionArtifact, ModelTrainerArtifact) {
    store
        .put_bytes(&threshold_model().to_bytes().unwrap(), "candidate/model.json")
        .unwrap();
    let csv = dir.join("test.csv");
    fs::write(&csv, "x,Response\n0.9,1\n0.1,0\n").unwrap();
    (
        DataIngestionArtifact { test_csv: csv },
        ModelTrainerArtifact {
            trained_model_key: "candidate/model.json".to_string(),
            trained_f1: Some(0.90),
        },
    )
}

#[test]
fn corrupt_production_artifact_evaluates_as_no_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("store"));
    store
        .put_bytes(b"\x00\x01 definitely not a model", "production/model.json")
        .unwrap();
    let (ingestion, trainer) = evaluation_fixture(dir.path(), &store);

    let evaluation = ModelEvaluation::new(
        &store,
        ModelEvaluationConfig {
            production_model_key: Some("production/model.json".to_string()),
        },
        ingestion,
        trainer,
    );

    let result = evaluation.evaluate().expect("corrupt baseline must soft-fail");
    assert_eq!(result.production_f1, None);
    assert!(result.accepted);
    assert!((result.delta - 0.90).abs() < 1e-12);
}

#[test]
fn incompatible_production_transform_version_evaluates_as_no_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("store"));

    let mut stale = threshold_model();
    stale.transform_version = 99;
    store
        .put_bytes(&stale.to_bytes().unwrap(), "production/model.json")
        .unwrap();
    let (ingestion, trainer) = evaluation_fixture(dir.path(), &store);

    let evaluation = ModelEvaluation::new(
        &store,
        ModelEvaluationConfig {
            production_model_key: Some("production/model.json".to_string()),
        },
        ingestion,
        trainer,
    );

    let result = evaluation.evaluate().unwrap();
    assert_eq!(result.production_f1, None);
    assert!(result.accepted);
}
