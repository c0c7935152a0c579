//! Serialized model format and the prediction contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use mgate_dataset::FeatureMatrix;
use mgate_store::StoreError;

/// Current wire format version of [`ModelArtifact`].
pub const MODEL_SCHEMA_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a model.
#[derive(Debug)]
pub enum ModelError {
    /// No artifact exists at the requested key.
    NotFound { key: String },
    /// Stored bytes are not readable as a model.
    Deserialize(String),
    /// The model was trained against a different transform version than the
    /// one this build of the pipeline applies.
    SchemaMismatch { expected: u32, found: u32 },
    /// Underlying store failure (I/O or transport).
    Store(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::NotFound { key } => write!(f, "no model artifact at key '{key}'"),
            ModelError::Deserialize(msg) => write!(f, "model deserialize failed: {msg}"),
            ModelError::SchemaMismatch { expected, found } => {
                write!(
                    f,
                    "model transform version {found} does not match pipeline version {expected}"
                )
            }
            ModelError::Store(msg) => write!(f, "model store error: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<StoreError> for ModelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => ModelError::NotFound { key },
            other => ModelError::Store(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction contract
// ---------------------------------------------------------------------------

/// The only capability the promotion core needs from a model.
///
/// Object-safe so the evaluator can score a `&dyn Model` without caring how
/// (or in what framework) it was trained.
pub trait Model: Send + Sync {
    /// Predict a label per row of `x`. Rows must already be in the model's
    /// trained feature order (see [`ModelArtifact::feature_names`] and
    /// `FeatureMatrix::align`).
    fn predict(&self, x: &FeatureMatrix) -> Vec<i64>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Serialized linear classifier: `label = (w · x + bias > threshold)`.
///
/// The artifact pins the exact feature order it was trained on and the
/// version of the shared transform that produced those features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: i32,
    /// `mgate_dataset::TRANSFORM_VERSION` at training time.
    pub transform_version: u32,
    /// Feature columns, in trained order.
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Decision threshold on the raw score.
    pub threshold: f64,
}

impl ModelArtifact {
    /// Decode an artifact from stored bytes, rejecting structurally
    /// incoherent payloads (weight/feature length mismatch).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Deserialize(e.to_string()))?;
        if artifact.weights.len() != artifact.feature_names.len() {
            return Err(ModelError::Deserialize(format!(
                "{} weights for {} features",
                artifact.weights.len(),
                artifact.feature_names.len()
            )));
        }
        Ok(artifact)
    }

    /// Encode for storage (pretty JSON, stable field order).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        serde_json::to_vec_pretty(self).map_err(|e| ModelError::Deserialize(e.to_string()))
    }

    /// Fail unless the artifact was trained against `transform_version`.
    pub fn check_transform_version(&self, expected: u32) -> Result<(), ModelError> {
        if self.transform_version != expected {
            return Err(ModelError::SchemaMismatch {
                expected,
                found: self.transform_version,
            });
        }
        Ok(())
    }
}

impl Model for ModelArtifact {
    fn predict(&self, x: &FeatureMatrix) -> Vec<i64> {
        x.rows
            .iter()
            .map(|row| {
                let score: f64 = row
                    .iter()
                    .zip(&self.weights)
                    .map(|(v, w)| v * w)
                    .sum::<f64>()
                    + self.bias;
                i64::from(score > self.threshold)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
