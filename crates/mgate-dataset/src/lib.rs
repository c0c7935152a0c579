//! Test-set ingestion and the shared feature transform.
//!
//! This crate is the single source of truth for everything that touches
//! feature shape: the target-column name, the CSV boundary, and the
//! deterministic feature-transformation pipeline applied identically at
//! training and evaluation time. Duplicating any of this in another crate
//! is how silent metric drift happens, so nothing here may be re-derived
//! elsewhere.

mod error;
mod table;
mod transform;

pub use error::SchemaError;
pub use table::{split_target, Table};
pub use transform::{transform_features, FeatureMatrix, TRANSFORM_VERSION};

/// Label column both the trainer and the evaluator split on.
pub const TARGET_COLUMN: &str = "Response";
