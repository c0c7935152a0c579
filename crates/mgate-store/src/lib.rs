//! Artifact storage boundary for ModelGate.
//!
//! Defines the backend-agnostic [`ObjectStore`] trait plus the two concrete
//! backends: a local-filesystem store and an HTTP object store. Callers hold
//! a `Box<dyn ObjectStore>` and never depend on which backend was wired in,
//! so swapping the filesystem for a remote bucket is a config change only.

mod http;
mod local;
mod store;

pub use http::HttpStore;
pub use local::LocalStore;
pub use store::{open_store, ObjectStore, StoreConfig, StoreError};
