//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{seed_records, ExpenseRecord};
use crate::store::Slot;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a gastos home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a fresh data home. Its slot is empty, so the first load
    /// returns the seed records.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("gastos");
        let config = Config::create(&root).await.unwrap();
        Self { temp_dir, config }
    }

    /// Creates a test environment whose slot holds an empty expense list.
    pub async fn empty() -> Self {
        let env = Self::new().await;
        env.config.store().save(&[]).await.unwrap();
        env
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory next to the data home, e.g. for exports.
    pub fn scratch(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("scratch")
    }

    /// The records currently saved in the data home.
    pub async fn stored(&self) -> Vec<ExpenseRecord> {
        self.config.store().load().await
    }

    /// The raw value of the expense slot, if any.
    pub async fn raw_slot(&self) -> Option<String> {
        crate::store::FileSlot::new(self.config.slots())
            .get(self.config.storage_key())
            .await
            .unwrap()
    }

    /// Replaces the expense slot with `raw` as is, e.g. a legacy or foreign document.
    pub async fn set_raw_slot(&self, raw: &str) {
        crate::store::FileSlot::new(self.config.slots())
            .set(self.config.storage_key(), raw)
            .await
            .unwrap();
    }

    /// Saves the seed records so that the slot is no longer empty.
    pub async fn save_seed(&self) {
        self.config.store().save(&seed_records()).await.unwrap();
    }
}
