//! Store-backed estimator: save, retrieve, and predict with a stored model.

use std::path::Path;

use tracing::debug;

use mgate_dataset::FeatureMatrix;
use mgate_store::ObjectStore;

use crate::artifact::{Model, ModelArtifact, ModelError};

/// A model slot in the artifact store, addressed by key.
///
/// The deserialized model is loaded lazily and cached for the lifetime of
/// the estimator (one evaluation/prediction session); nothing in-memory
/// outlives the session.
pub struct Estimator<'a> {
    store: &'a dyn ObjectStore,
    key: String,
    cached: Option<ModelArtifact>,
}

impl<'a> Estimator<'a> {
    pub fn new(store: &'a dyn ObjectStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cached: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when an artifact exists at this slot.
    pub fn is_present(&self) -> Result<bool, ModelError> {
        Ok(self.store.exists(&self.key)?)
    }

    /// Load (and cache) the model from the store.
    pub fn load(&mut self) -> Result<&ModelArtifact, ModelError> {
        if self.cached.is_none() {
            let bytes = self.store.get(&self.key)?;
            let artifact = ModelArtifact::from_bytes(&bytes)?;
            debug!(key = %self.key, features = artifact.feature_names.len(), "loaded model");
            self.cached = Some(artifact);
        }
        Ok(self.cached.as_ref().unwrap())
    }

    /// Save the serialized model file at `source` into this slot.
    pub fn save(&self, source: &Path, remove_source: bool) -> Result<(), ModelError> {
        self.store.put(source, &self.key, remove_source)?;
        Ok(())
    }

    /// Predict with the stored model, aligning `x` to its trained feature
    /// order first.
    pub fn predict(&mut self, x: &FeatureMatrix) -> Result<Vec<i64>, ModelError> {
        let model = self.load()?;
        let aligned = x.align(&model.feature_names);
        Ok(model.predict(&aligned))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use mgate_store::LocalStore;

    use super::*;
    use crate::artifact::MODEL_SCHEMA_VERSION;

    fn sample_model() -> ModelArtifact {
        ModelArtifact {
            schema_version: MODEL_SCHEMA_VERSION,
            transform_version: 1,
            feature_names: vec!["a".to_string(), "b".to_string()],
            weights: vec![1.0, -1.0],
            bias: 0.0,
            threshold: 0.0,
        }
    }

    #[test]
    fn save_then_load_round_trips_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("store"));

        let model = sample_model();
        let src = dir.path().join("trained.json");
        fs::write(&src, model.to_bytes().unwrap()).unwrap();

        let mut estimator = Estimator::new(&store, "candidate/model.json");
        assert!(!estimator.is_present().unwrap());
        estimator.save(&src, false).unwrap();
        assert!(estimator.is_present().unwrap());

        let x = FeatureMatrix {
            feature_names: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec![2.0, 1.0], vec![1.0, 2.0]],
        };
        assert_eq!(estimator.predict(&x).unwrap(), model.predict(&x));
    }

    #[test]
    fn load_missing_slot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        let mut estimator = Estimator::new(&store, "absent.json");
        match estimator.load() {
            Err(ModelError::NotFound { key }) => assert_eq!(key, "absent.json"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn corrupt_artifact_is_a_deserialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store.put_bytes(b"\x00corrupt", "prod.json").unwrap();

        let mut estimator = Estimator::new(&store, "prod.json");
        assert!(matches!(
            estimator.load(),
            Err(ModelError::Deserialize(_))
        ));
    }

    #[test]
    fn predict_aligns_columns_to_trained_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store
            .put_bytes(&sample_model().to_bytes().unwrap(), "m.json")
            .unwrap();

        // Swapped column order relative to training.
        let x = FeatureMatrix {
            feature_names: vec!["b".to_string(), "a".to_string()],
            rows: vec![vec![1.0, 2.0]],
        };
        let mut estimator = Estimator::new(&store, "m.json");
        // a=2, b=1 => score 1 > 0 => label 1.
        assert_eq!(estimator.predict(&x).unwrap(), vec![1]);
    }
}
