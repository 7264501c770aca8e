//! Credential store for the model API key.
//!
//! The store is keyed by record id; the pipeline only ever uses one logical
//! record, [`CURRENT_KEY`]. The orchestrator never reads the store itself: a
//! caller resolves the key here and passes it to `Orchestrator::connect`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Record id of the active API key.
pub const CURRENT_KEY: &str = "current";

/// Environment variable that overrides the stored key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Key-value persistence for credentials.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    /// Remove a record. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool>;
}

/// JSON file store (`.grammar/credentials.json`).
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read credentials {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parse credentials {}", self.path.display()))
    }

    fn save(&self, records: &BTreeMap<String, String>) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(records).context("serialize credentials")?;
        buf.push('\n');
        super::write_atomic(&self.path, &buf)?;
        restrict_permissions(&self.path)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(anyhow!("refusing to store a blank credential"));
        }
        let mut records = self.load()?;
        records.insert(key.to_string(), value.trim().to_string());
        debug!(path = %self.path.display(), key, "storing credential");
        self.save(&records)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut records = self.load()?;
        if records.remove(key).is_none() {
            return Ok(false);
        }
        debug!(path = %self.path.display(), key, "deleting credential");
        self.save(&records)?;
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// In-memory store for embedding callers and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(anyhow!("refusing to store a blank credential"));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        records.insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(records.remove(key).is_some())
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Store,
}

/// Resolve the active API key: a non-blank environment value wins over the store.
pub fn resolve_api_key(
    store: &dyn CredentialStore,
    env_value: Option<String>,
) -> Result<Option<(String, KeySource)>> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(Some((value, KeySource::Environment)));
    }
    Ok(store
        .get(CURRENT_KEY)?
        .filter(|v| !v.trim().is_empty())
        .map(|v| (v, KeySource::Store)))
}

/// Display form of a stored key; never reveals any characters.
pub const MASKED_KEY: &str = "••••••••";
