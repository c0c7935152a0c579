//! Model contract and store-backed estimator.
//!
//! The core never trains a model; it only deserializes one from the artifact
//! store and asks it to predict. [`Model`] is the whole contract. The
//! concrete wire format is [`ModelArtifact`] — a serialized linear
//! classifier — but callers downstream of loading only ever see the trait.

mod artifact;
mod estimator;

pub use artifact::{Model, ModelArtifact, ModelError, MODEL_SCHEMA_VERSION};
pub use estimator::Estimator;
