//! Local-filesystem store backend.
//!
//! Objects are plain files under a base directory; a key is the relative
//! path of the file under that root. The copy path is `fs::copy`, not a
//! rename, so the same semantics hold when root and source sit on
//! different devices.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::store::{ObjectStore, StoreError};

/// Filesystem-backed [`ObjectStore`] rooted at a base directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Absolute path of the object a key names.
    fn full_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn ensure_parent_dir(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir '{}': {e}", parent.display())))?;
        }
        Ok(())
    }
}

impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.full_path(key).is_file())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.full_path(key);
        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StoreError::Io(format!("read '{}': {e}", path.display()))
            }
        })
    }

    fn put(&self, source: &Path, key: &str, remove_source: bool) -> Result<(), StoreError> {
        let dest = self.full_path(key);
        self.ensure_parent_dir(&dest)?;

        fs::copy(source, &dest).map_err(|e| {
            StoreError::Io(format!(
                "copy '{}' -> '{}': {e}",
                source.display(),
                dest.display()
            ))
        })?;
        debug!(key, source = %source.display(), "local store put");

        // Copy-then-delete ordering: the source only goes away once the
        // object is durably in place.
        if remove_source {
            fs::remove_file(source)
                .map_err(|e| StoreError::Io(format!("remove '{}': {e}", source.display())))?;
        }
        Ok(())
    }

    fn put_bytes(&self, bytes: &[u8], key: &str) -> Result<(), StoreError> {
        let dest = self.full_path(key);
        self.ensure_parent_dir(&dest)?;
        fs::write(&dest, bytes)
            .map_err(|e| StoreError::Io(format!("write '{}': {e}", dest.display())))?;
        debug!(key, len = bytes.len(), "local store put_bytes");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
