//! Model pusher: copy an accepted candidate into the production slot.

use std::fmt;

use tracing::info;

use mgate_store::{ObjectStore, StoreError};

use crate::types::{ModelEvaluationArtifact, ModelPusherArtifact, PromotionRecord};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PushError {
    /// Push invoked on a rejected evaluation. The caller must gate on
    /// `is_accepted`; no write is performed.
    NotAccepted,
    /// Store failure while copying the artifact.
    Store(StoreError),
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::NotAccepted => {
                write!(f, "push requires an accepted evaluation (is_accepted = false)")
            }
            PushError::Store(e) => write!(f, "push store error: {e}"),
        }
    }
}

impl std::error::Error for PushError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PushError::NotAccepted => None,
            PushError::Store(e) => Some(e),
        }
    }
}

impl From<StoreError> for PushError {
    fn from(e: StoreError) -> Self {
        PushError::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Pusher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModelPusherConfig {
    /// Store key of the production slot the accepted candidate is copied to.
    pub production_model_key: String,
}

/// Copies the candidate artifact into the production slot of the store.
///
/// Not transactional: a crash mid-copy can leave a partial production
/// artifact. The copy is a full overwrite, so the recovery policy is simply
/// to re-run the push.
pub struct ModelPusher<'a> {
    store: &'a dyn ObjectStore,
    config: ModelPusherConfig,
}

impl<'a> ModelPusher<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: ModelPusherConfig) -> Self {
        Self { store, config }
    }

    /// Promote the evaluated candidate. Only callable on an accepted
    /// evaluation; a rejected one returns [`PushError::NotAccepted`] before
    /// any store access.
    pub fn push(
        &self,
        evaluation: &ModelEvaluationArtifact,
    ) -> Result<PromotionRecord, PushError> {
        if !evaluation.is_accepted {
            return Err(PushError::NotAccepted);
        }

        let source_key = &evaluation.trained_model_path;
        let dest_key = &self.config.production_model_key;

        let bytes = self.store.get(source_key)?;
        self.store.put_bytes(&bytes, dest_key)?;

        info!(
            source = source_key.as_str(),
            dest = dest_key.as_str(),
            backend = self.store.name(),
            "promoted candidate to production slot"
        );

        Ok(PromotionRecord {
            stored_path: dest_key.clone(),
            source_path: source_key.clone(),
        })
    }

    /// Run [`Self::push`] and package the downstream artifact.
    pub fn initiate(
        &self,
        evaluation: &ModelEvaluationArtifact,
    ) -> Result<ModelPusherArtifact, PushError> {
        let record = self.push(evaluation)?;
        Ok(ModelPusherArtifact {
            saved_model_path: record.stored_path,
        })
    }
}
