//! Store trait, error type, and backend selection.
//!
//! This module defines **only** the storage contract. Concrete backends live
//! in `local.rs` and `http.rs`; callers go through [`open_store`] and never
//! name a backend type directly.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{HttpStore, LocalStore};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that an [`ObjectStore`] backend may return.
#[derive(Debug)]
pub enum StoreError {
    /// No object exists at the requested key.
    NotFound { key: String },
    /// Local filesystem failure (open / copy / remove).
    Io(String),
    /// Network or transport failure (remote backend).
    Transport(String),
    /// The remote endpoint answered with a non-success status.
    Api { status: u16, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { key } => write!(f, "no object at key '{key}'"),
            StoreError::Io(msg) => write!(f, "store io error: {msg}"),
            StoreError::Transport(msg) => write!(f, "store transport error: {msg}"),
            StoreError::Api { status, message } => {
                write!(f, "store api error status={status}: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Key-addressed object storage.
///
/// Keys are relative paths under the backend's root (base directory or base
/// URL). The store owns the physical bytes; callers hold only keys.
///
/// Implementations must be object-safe and `Send + Sync` so callers can hold
/// a `Box<dyn ObjectStore>` without knowing the concrete backend. No method
/// may assume POSIX-only semantics (in particular, no reliance on atomic
/// rename) so that a remote implementation stays drop-in substitutable.
pub trait ObjectStore: Send + Sync {
    /// Human-readable backend name (e.g. `"local"`, `"http"`).
    fn name(&self) -> &'static str;

    /// True when an object exists at `key`.
    ///
    /// A missing key is `Ok(false)`, never an error. `Err` is reserved for
    /// backend failures (I/O, transport).
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Read the full object at `key`.
    ///
    /// Returns [`StoreError::NotFound`] when the key is absent.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write the file at `source` to `key`.
    ///
    /// Creates any intermediate structure the key implies. An existing object
    /// at `key` is fully overwritten (last write wins, no merge). When
    /// `remove_source` is set, the source file is deleted only **after** the
    /// copy succeeded; a failed copy leaves the source untouched.
    fn put(&self, source: &Path, key: &str, remove_source: bool) -> Result<(), StoreError>;

    /// Write an in-memory payload to `key`.
    ///
    /// Same overwrite semantics as [`ObjectStore::put`]; used for
    /// store-to-store copies where no scratch file exists.
    fn put_bytes(&self, bytes: &[u8], key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Which backend to wire in, normally deserialized from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Objects are files under a local base directory.
    Local { root: PathBuf },
    /// Objects live under an HTTP(S) base URL.
    Remote {
        base_url: String,
        /// Optional bearer token. Usually injected from the environment
        /// rather than written into the config file.
        #[serde(default)]
        token: Option<String>,
    },
}

/// Build the store a config names.
pub fn open_store(config: &StoreConfig) -> Box<dyn ObjectStore> {
    match config {
        StoreConfig::Local { root } => Box::new(LocalStore::new(root.clone())),
        StoreConfig::Remote { base_url, token } => {
            Box::new(HttpStore::new(base_url.clone(), token.clone()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
