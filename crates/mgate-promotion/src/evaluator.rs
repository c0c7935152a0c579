//! Model evaluation: score the candidate against the deployed baseline.
//!
//! Candidate-side failures (dataset unreadable, candidate artifact missing or
//! corrupt, transform-version mismatch) are caller errors and propagate.
//! Baseline-side failures do not: a missing, corrupt, or incompatible
//! production model is an expected first-deployment state and collapses to
//! "no baseline", logged at warn. Truly unexpected failures (panics) are not
//! caught anywhere on that path.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

use mgate_dataset::{
    split_target, transform_features, FeatureMatrix, SchemaError, Table, TRANSFORM_VERSION,
};
use mgate_model::{Estimator, ModelError};
use mgate_store::ObjectStore;

use crate::metrics::f1_score;
use crate::types::{EvaluationResult, ModelEvaluationArtifact};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Hard failures of an evaluation cycle.
#[derive(Debug)]
pub enum EvalError {
    /// Test dataset unreadable or malformed.
    Dataset(SchemaError),
    /// Candidate model missing, corrupt, or incompatible.
    Model(ModelError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Dataset(e) => write!(f, "evaluation dataset error: {e}"),
            EvalError::Model(e) => write!(f, "candidate model error: {e}"),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Dataset(e) => Some(e),
            EvalError::Model(e) => Some(e),
        }
    }
}

impl From<SchemaError> for EvalError {
    fn from(e: SchemaError) -> Self {
        EvalError::Dataset(e)
    }
}

impl From<ModelError> for EvalError {
    fn from(e: ModelError) -> Self {
        EvalError::Model(e)
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Output of the upstream ingestion stage this cycle consumes.
#[derive(Debug, Clone)]
pub struct DataIngestionArtifact {
    /// Held-out test set (CSV with the fixed target column).
    pub test_csv: PathBuf,
}

/// Output of the upstream training stage this cycle consumes.
#[derive(Debug, Clone)]
pub struct ModelTrainerArtifact {
    /// Store key of the newly trained model.
    pub trained_model_key: String,
    /// Held-out F1 the trainer already measured, if it did. When set, the
    /// evaluator trusts it instead of recomputing the candidate score.
    pub trained_f1: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ModelEvaluationConfig {
    /// Store key of the deployed baseline slot. `None` disables the
    /// comparison entirely (first deployment).
    pub production_model_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// One evaluation cycle over a store, a test set, and a candidate key.
pub struct ModelEvaluation<'a> {
    store: &'a dyn ObjectStore,
    config: ModelEvaluationConfig,
    ingestion: DataIngestionArtifact,
    trainer: ModelTrainerArtifact,
}

impl<'a> ModelEvaluation<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        config: ModelEvaluationConfig,
        ingestion: DataIngestionArtifact,
        trainer: ModelTrainerArtifact,
    ) -> Self {
        Self {
            store,
            config,
            ingestion,
            trainer,
        }
    }

    /// Run the comparison and render the accept/reject decision.
    pub fn evaluate(&self) -> Result<EvaluationResult, EvalError> {
        let table = Table::from_csv_path(&self.ingestion.test_csv)?;
        let (features, y) = split_target(table)?;
        let x = transform_features(&features)?;
        info!(
            rows = x.rows.len(),
            features = x.feature_names.len(),
            "loaded held-out test set"
        );

        // Candidate path: every failure here is fatal to the cycle.
        let mut candidate = Estimator::new(self.store, self.trainer.trained_model_key.clone());
        candidate
            .load()?
            .check_transform_version(TRANSFORM_VERSION)?;
        let candidate_f1 = match self.trainer.trained_f1 {
            Some(score) => score,
            None => f1_score(&y, &candidate.predict(&x)?),
        };

        // Baseline path: recoverable failures mean "no baseline".
        let production_f1 = match &self.config.production_model_key {
            None => None,
            Some(key) => match self.score_production(key, &x, &y) {
                Ok(score) => Some(score),
                Err(err) => {
                    warn!(key = %key, %err, "production model unusable, evaluating without baseline");
                    None
                }
            },
        };

        let result = EvaluationResult::decide(candidate_f1, production_f1);
        info!(
            candidate_f1 = result.candidate_f1,
            production_f1 = ?result.production_f1,
            accepted = result.accepted,
            delta = result.delta,
            "evaluation decision"
        );
        Ok(result)
    }

    /// Run [`Self::evaluate`] and package the downstream artifact.
    pub fn initiate(&self) -> Result<ModelEvaluationArtifact, EvalError> {
        let result = self.evaluate()?;
        Ok(ModelEvaluationArtifact::from_result(
            &result,
            self.trainer.trained_model_key.clone(),
            self.config.production_model_key.clone(),
        ))
    }

    /// Score the deployed baseline over the same transformed test set.
    ///
    /// Any error out of here is treated as "no usable baseline" by the
    /// caller, so this deliberately checks `exists` first and maps an absent
    /// slot to [`ModelError::NotFound`] rather than touching `get`.
    fn score_production(
        &self,
        key: &str,
        x: &FeatureMatrix,
        y: &[i64],
    ) -> Result<f64, ModelError> {
        if !self.store.exists(key)? {
            return Err(ModelError::NotFound {
                key: key.to_string(),
            });
        }
        let mut production = Estimator::new(self.store, key);
        production
            .load()?
            .check_transform_version(TRANSFORM_VERSION)?;
        Ok(f1_score(y, &production.predict(x)?))
    }
}
