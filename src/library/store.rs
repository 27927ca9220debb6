use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Namespaced persistence for library state
pub trait Store: Send + Sync {
    /// Stored value for `namespace`, or `None` if nothing was saved yet
    fn load(&self, namespace: &str) -> Result<Option<Value>>;

    fn save(&self, namespace: &str, value: &Value) -> Result<()>;
}

/// One `<namespace>.json` file per namespace under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl Store for JsonFileStore {
    fn load(&self, namespace: &str) -> Result<Option<Value>> {
        let path = self.path_for(namespace);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store file: {}", path.display()))?;

        debug!("Loaded {} from {}", namespace, path.display());
        Ok(Some(value))
    }

    fn save(&self, namespace: &str, value: &Value) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.path_for(namespace);
        let tmp = self.dir.join(format!(".{}.json.tmp", namespace));
        let content = serde_json::to_string_pretty(value).context("Failed to serialize store value")?;

        // The target file is only ever replaced by a complete one
        std::fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!("Saved {} to {}", namespace, path.display());
        Ok(())
    }
}

/// In-process store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self, namespace: &str) -> Result<Option<Value>> {
        let values = self.values.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(values.get(namespace).cloned())
    }

    fn save(&self, namespace: &str, value: &Value) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        values.insert(namespace.to_string(), value.clone());
        Ok(())
    }
}
