//! Configuration for a promotion cycle.
//!
//! One file (YAML or JSON, picked by extension) names the store backend, the
//! model keys, and the test dataset. The canonical SHA-256 hash of the
//! effective config is stamped into every evaluation report so a report can
//! always be traced back to the exact configuration that produced it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use mgate_store::StoreConfig;

/// Env var consulted for the remote-store bearer token when the config file
/// leaves it unset. Tokens belong in the environment, not in config files.
pub const STORE_TOKEN_ENV: &str = "MGATE_STORE_TOKEN";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub store: StoreConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
    /// Where evaluation reports are written. Default: current directory.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Store key of the newly trained model under evaluation.
    pub candidate_key: String,
    /// Store key of the deployed baseline. `None` means "no baseline yet"
    /// (first deployment).
    #[serde(default)]
    pub production_key: Option<String>,
    /// Held-out F1 carried over from the trainer artifact. When set, the
    /// evaluator trusts it instead of recomputing the candidate score.
    #[serde(default)]
    pub trained_f1: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Held-out test set (CSV with the fixed target column).
    pub test_csv: PathBuf,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a config file, dispatching on extension (`.yaml` / `.yml` / `.json`),
/// then apply environment overrides.
pub fn load_config(path: &Path) -> Result<GateConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let mut config: GateConfig = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&raw)
            .with_context(|| format!("parse yaml config '{}'", path.display()))?,
        "json" => serde_json::from_str(&raw)
            .with_context(|| format!("parse json config '{}'", path.display()))?,
        other => bail!("unsupported config extension '{other}' (expected yaml, yml, or json)"),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Fill the remote-store token from [`STORE_TOKEN_ENV`] when the file left
/// it unset.
pub fn apply_env_overrides(config: &mut GateConfig) {
    if let StoreConfig::Remote { token, .. } = &mut config.store {
        if token.is_none() {
            *token = std::env::var(STORE_TOKEN_ENV).ok();
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical hash
// ---------------------------------------------------------------------------

/// SHA-256 over the canonical JSON form of the config (object keys sorted at
/// every depth), hex-encoded. Equal configs hash equal regardless of key
/// order or source format.
pub fn config_hash(config: &GateConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("serialize config for hashing")?;
    let canonical = canonical_json(&value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let inner: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonical_json(v)
                    )
                })
                .collect();
            format!("{{{}}}", inner.join(","))
        }
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", inner.join(","))
        }
        leaf => serde_json::to_string(leaf).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
