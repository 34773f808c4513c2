//! Key-value persistence backends for clipboard history.
//!
//! `JsonFileStorage` keeps every key in one JSON object on disk and rewrites
//! the file atomically (temp file + rename) on each `set`. `MemoryStorage` is
//! the non-persistent fallback and the test double.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

/// Persistent key-value store
pub trait Storage: Send {
    /// Read the value stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Value>>;
    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// JSON document on disk holding all keys
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            other => bail!(
                "Store file {} is not a JSON object (found {})",
                self.path.display(),
                json_type_name(&other)
            ),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(document).context("Failed to serialize store")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp store file: {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to rename temp file to {}", self.path.display())
        })?;

        debug!(path = %self.path.display(), bytes = json.len(), "Saved store (atomic)");
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    #[instrument(name = "storage_get", skip(self), fields(path = %self.path.display()))]
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    #[instrument(name = "storage_set", skip(self, value), fields(path = %self.path.display()))]
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        // Other keys in an unreadable document are lost; the history key is
        // about to be rewritten in full anyway.
        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Existing store unreadable, rewriting from scratch");
                Map::new()
            }
        };
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory storage. Clones share the same map, so a test can keep a handle
/// and inspect what the history store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<Map<String, Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (simulates a full disk)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct read without going through the trait
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    /// Seed a raw value, bypassing the write-failure switch
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("Simulated write failure for key '{}'", key);
        }
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
