//! Key-value slots: the persistent string storage that the record store writes its document to.

use crate::{utils, Result};
use anyhow::{ensure, Context};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// A string-valued key-value store. The record store keeps its whole document under one key.
#[async_trait::async_trait]
pub trait Slot: Send + Sync {
    /// Returns the value stored under `key`, `None` if nothing is stored there.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as a file named `<key>.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that holds `key`.
    pub fn path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl Slot for FileSlot {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        trace!("Reading slot {}", path.display());
        utils::read_optional(&path).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        trace!("Writing slot {}", path.display());
        // Write to a sibling file and rename so a failed write never truncates the old value
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        utils::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Unable to replace {}", path.display()))
    }
}

/// Holds values in memory. Used by tests and anywhere persistence is not wanted.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| anyhow::anyhow!("The in-memory slot lock is poisoned"))
    }
}

#[async_trait::async_trait]
impl Slot for MemorySlot {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keys become file names, so they are limited to a safe character set.
fn validate_key(key: &str) -> Result<()> {
    ensure!(!key.is_empty(), "The storage key cannot be empty");
    ensure!(
        key.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.'),
        "Invalid storage key '{key}': use letters, digits, '-', '_' and '.'"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_slot_get_missing() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path());
        assert!(slot.get("synergy-expenses-v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_slot_set_get_overwrite() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path());
        slot.set("k", "one").await.unwrap();
        slot.set("k", "two").await.unwrap();
        assert_eq!(slot.get("k").await.unwrap().as_deref(), Some("two"));
        assert!(dir.path().join("k.json").is_file());
        assert!(!dir.path().join(".k.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_slot_set_fails_without_dir() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path().join("missing"));
        assert!(slot.set("k", "v").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_slot() {
        let slot = MemorySlot::new();
        assert!(slot.get("k").await.unwrap().is_none());
        slot.set("k", "v").await.unwrap();
        let shared = slot.clone();
        assert_eq!(shared.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("synergy-expenses-v1").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
