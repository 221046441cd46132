//! The record store: loads and saves the expense list in a key-value slot and implements the two
//! mutations, insert and remove.
//!
//! The slot holds one JSON document:
//!
//! ```json
//! { "version": 1, "records": [ { "id": "exp-…", "date": "2025-09-02", "event": "…",
//!   "detail": "Peajes", "food": 500, "fuel": 1115, "other": 200 } ] }
//! ```
//!
//! A bare JSON array of records, the format written before the document was versioned, is still
//! read.

mod slot;

pub use slot::{FileSlot, MemorySlot, Slot};

use crate::backup::Backup;
use crate::model::{seed_records, ExpenseDraft, ExpenseRecord};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, warn};

/// The slot key the expense list is stored under unless configured otherwise.
pub const STORAGE_KEY: &str = "synergy-expenses-v1";

/// The version of the document this build writes.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    version: u32,
    records: Vec<ExpenseRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Versioned(Document),
    Legacy(Vec<ExpenseRecord>),
}

/// Reads and writes the expense list.
#[derive(Clone)]
pub struct RecordStore {
    slot: Arc<dyn Slot>,
    key: String,
    backup: Option<Backup>,
}

impl Debug for RecordStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("key", &self.key)
            .field("backup", &self.backup)
            .finish()
    }
}

impl RecordStore {
    pub fn new(slot: impl Slot + 'static, key: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(slot),
            key: key.into(),
            backup: None,
        }
    }

    /// Keeps a backup of the previous slot value each time the store is saved.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the expense list. This never fails: when the slot is empty, cannot be read or holds
    /// something that does not parse, the seed records are returned instead.
    ///
    /// Records without an id, or with an id already used by an earlier record, are given a new one.
    pub async fn load(&self) -> Vec<ExpenseRecord> {
        self.load_document().await.records
    }

    /// Like `load`, but also reports what was found in the slot so that the caller can persist
    /// repaired ids or avoid overwriting a document it does not understand.
    pub async fn load_document(&self) -> Loaded {
        let raw = match self.slot.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Nothing stored under '{}', starting from seed data", self.key);
                return Loaded::seed(SlotState::Empty);
            }
            Err(e) => {
                warn!("Unable to read stored expenses, starting from seed data: {e:#}");
                return Loaded::seed(SlotState::Unreadable);
            }
        };
        if let Some(version) = newer_version(&raw) {
            warn!(
                "The expenses in '{}' were written by a newer version of gastos (document version \
                {version}). Showing seed data; the stored expenses will not be overwritten.",
                self.key
            );
            return Loaded::seed(SlotState::Newer(version));
        }
        match parse_document(&raw) {
            Ok(records) => {
                debug!("Loaded {} expenses from '{}'", records.len(), self.key);
                let (records, repaired) = assign_missing_ids(records);
                let state = if repaired {
                    SlotState::Repaired
                } else {
                    SlotState::Current
                };
                Loaded { records, state }
            }
            Err(e) => {
                warn!("Stored expenses are unreadable, starting from seed data: {e:#}");
                Loaded::seed(SlotState::Unreadable)
            }
        }
    }

    /// Writes the full expense list to the slot, replacing whatever was there.
    ///
    /// # Errors
    /// - Returns an error if the slot holds a document written by a newer version, if the
    ///   document cannot be serialized or if the slot cannot be written.
    pub async fn save(&self, records: &[ExpenseRecord]) -> Result<()> {
        let document = Document {
            version: DOCUMENT_VERSION,
            records: records.to_vec(),
        };
        let json =
            serde_json::to_string_pretty(&document).context("Unable to serialize expenses")?;
        match self.slot.get(&self.key).await {
            Ok(Some(previous)) => {
                if let Some(version) = newer_version(&previous) {
                    bail!(
                        "Refusing to overwrite '{}': it holds document version {version}, written \
                        by a newer version of gastos",
                        self.key
                    );
                }
                if previous != json {
                    self.backup_previous(&previous).await;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Unable to read '{}' before saving: {e:#}", self.key),
        }
        self.slot
            .set(&self.key, &json)
            .await
            .with_context(|| format!("Unable to save expenses to '{}'", self.key))?;
        debug!("Saved {} expenses to '{}'", records.len(), self.key);
        Ok(())
    }

    /// Copies `previous` to the backups directory. Failures only produce a warning.
    async fn backup_previous(&self, previous: &str) {
        let Some(backup) = &self.backup else {
            return;
        };
        if let Err(e) = backup.save_json(&self.key, previous).await {
            warn!("Unable to back up '{}': {e:#}", self.key);
        }
    }
}

/// What `RecordStore::load_document` found in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing is stored yet. The records are the seed records.
    Empty,
    /// The records are exactly what is stored.
    Current,
    /// Some records were given new ids. The ids exist only in memory until the records are saved.
    Repaired,
    /// The slot could not be read or parsed. The records are the seed records.
    Unreadable,
    /// The slot holds a document of a newer version, which must not be overwritten. The records
    /// are the seed records.
    Newer(u32),
}

/// The result of `RecordStore::load_document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub records: Vec<ExpenseRecord>,
    pub state: SlotState,
}

impl Loaded {
    fn seed(state: SlotState) -> Self {
        Self {
            records: seed_records(),
            state,
        }
    }
}

#[derive(Deserialize)]
struct DocumentVersion {
    version: u32,
}

/// Returns the version of `raw` if it is a versioned document newer than this build understands.
fn newer_version(raw: &str) -> Option<u32> {
    serde_json::from_str::<DocumentVersion>(raw)
        .ok()
        .map(|doc| doc.version)
        .filter(|&version| version > DOCUMENT_VERSION)
}

fn parse_document(raw: &str) -> Result<Vec<ExpenseRecord>> {
    if raw.trim().is_empty() {
        bail!("The stored document is empty");
    }
    let stored: StoredDocument =
        serde_json::from_str(raw).context("The stored document is not valid")?;
    match stored {
        StoredDocument::Legacy(records) => Ok(records),
        StoredDocument::Versioned(doc) if doc.version <= DOCUMENT_VERSION => Ok(doc.records),
        StoredDocument::Versioned(doc) => bail!(
            "The stored document has version {}, this program only understands up to {}. \
            Is a newer version of gastos available?",
            doc.version,
            DOCUMENT_VERSION
        ),
    }
}

/// Gives every record without an id, or with a duplicate one, a fresh id. Returns whether any
/// record changed.
fn assign_missing_ids(mut records: Vec<ExpenseRecord>) -> (Vec<ExpenseRecord>, bool) {
    let mut seen = HashSet::new();
    let mut repaired = false;
    for record in records.iter_mut() {
        if !record.has_id() || !seen.insert(record.id().to_string()) {
            let id = utils::generate_expense_id();
            debug!("Assigning id {id} to the expense of {}", record.date());
            record.set_id(id.clone());
            seen.insert(id);
            repaired = true;
        }
    }
    (records, repaired)
}

/// Validates `draft` and appends it to `records`.
///
/// Returns the new list along with the inserted record, which carries a freshly generated id.
///
/// # Errors
/// - Returns an error if the date or the event is blank, or if an amount is negative. The
///   caller's list is untouched.
pub fn insert(
    records: &[ExpenseRecord],
    draft: ExpenseDraft,
    default_detail: &str,
) -> Result<(Vec<ExpenseRecord>, ExpenseRecord)> {
    let record = draft.normalize(utils::generate_expense_id(), default_detail)?;
    let mut next = records.to_vec();
    next.push(record.clone());
    Ok((next, record))
}

/// The result of `remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The record was removed. Holds the new list and the removed record.
    Removed(Vec<ExpenseRecord>, ExpenseRecord),
    /// The user declined. Nothing changed.
    Declined,
}

/// Removes the record with `id` after `confirm` approves it.
///
/// # Errors
/// - Returns an error if no record has `id`.
pub fn remove<F>(records: &[ExpenseRecord], id: &str, confirm: F) -> Result<Removal>
where
    F: FnOnce(&ExpenseRecord) -> bool,
{
    let Some(target) = records.iter().find(|r| r.id() == id) else {
        bail!("Expense not found: {id}");
    };
    if !confirm(target) {
        return Ok(Removal::Declined);
    }
    let removed = target.clone();
    let next = records.iter().filter(|r| r.id() != id).cloned().collect();
    Ok(Removal::Removed(next, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, DEFAULT_DETAIL};
    use tempfile::TempDir;

    fn store() -> (RecordStore, MemorySlot) {
        let slot = MemorySlot::new();
        (RecordStore::new(slot.clone(), STORAGE_KEY), slot)
    }

    fn draft(date: &str, event: &str) -> ExpenseDraft {
        ExpenseDraft::new(date, event).amounts("100", "200", "")
    }

    #[tokio::test]
    async fn test_load_empty_slot_returns_seed() {
        let (store, _) = store();
        let records = store.load().await;
        assert_eq!(records, seed_records());
    }

    #[tokio::test]
    async fn test_load_garbage_returns_seed() {
        let (store, slot) = store();
        slot.set(STORAGE_KEY, "{not json").await.unwrap();
        assert_eq!(store.load().await, seed_records());
        slot.set(STORAGE_KEY, "").await.unwrap();
        assert_eq!(store.load().await, seed_records());
    }

    #[tokio::test]
    async fn test_load_newer_version_returns_seed() {
        let (store, slot) = store();
        slot.set(STORAGE_KEY, r#"{"version": 99, "records": []}"#)
            .await
            .unwrap();
        assert_eq!(store.load().await, seed_records());
        assert_eq!(store.load_document().await.state, SlotState::Newer(99));
    }

    #[tokio::test]
    async fn test_save_refuses_to_overwrite_newer_version() {
        let (store, slot) = store();
        let newer = r#"{"version":2,"records":[{"id":"keep-me","date":"2025-09-01","event":"A"}]}"#;
        slot.set(STORAGE_KEY, newer).await.unwrap();
        let err = store.save(&seed_records()).await.unwrap_err();
        assert!(err.to_string().contains("newer version"));
        assert_eq!(slot.get(STORAGE_KEY).await.unwrap().unwrap(), newer);
    }

    #[tokio::test]
    async fn test_load_document_state() {
        let (store, slot) = store();
        assert_eq!(store.load_document().await.state, SlotState::Empty);
        store.save(&seed_records()).await.unwrap();
        assert_eq!(store.load_document().await.state, SlotState::Current);
        slot.set(STORAGE_KEY, "[]x").await.unwrap();
        assert_eq!(store.load_document().await.state, SlotState::Unreadable);
        slot.set(STORAGE_KEY, r#"[{"date":"2025-09-01","event":"A"}]"#)
            .await
            .unwrap();
        assert_eq!(store.load_document().await.state, SlotState::Repaired);
    }

    #[tokio::test]
    async fn test_load_unreadable_slot_returns_seed() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the read fail
        std::fs::create_dir(dir.path().join(format!("{STORAGE_KEY}.json"))).unwrap();
        let store = RecordStore::new(FileSlot::new(dir.path()), STORAGE_KEY);
        assert_eq!(store.load().await, seed_records());
    }

    #[tokio::test]
    async fn test_load_legacy_array_assigns_ids() {
        let (store, slot) = store();
        let legacy = r#"[
            {"date":"2025-09-02","event":"A","detail":"Peajes","food":500,"fuel":1115,"other":200},
            {"date":"2025-09-02","event":"A","detail":"Peajes","food":500,"fuel":1115,"other":200}
        ]"#;
        slot.set(STORAGE_KEY, legacy).await.unwrap();
        let records = store.load().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.id().starts_with("exp-")));
        // Identical content still gets distinct identities
        assert_ne!(records[0].id(), records[1].id());
        assert_eq!(records[0].total(), Amount::from_pesos(1815));
    }

    #[tokio::test]
    async fn test_load_duplicate_ids_are_reassigned() {
        let (store, slot) = store();
        let doc = r#"{"version":1,"records":[
            {"id":"x","date":"2025-09-01","event":"A"},
            {"id":"x","date":"2025-09-02","event":"B"}
        ]}"#;
        slot.set(STORAGE_KEY, doc).await.unwrap();
        let records = store.load().await;
        assert_eq!(records[0].id(), "x");
        assert_ne!(records[1].id(), "x");
    }

    #[tokio::test]
    async fn test_save_then_load_is_lossless() {
        let (store, _) = store();
        let loaded = store.load().await;
        let (records, _) = insert(
            &loaded,
            ExpenseDraft::new("2025-10-01", "Cena")
                .detail("Comida")
                .amounts("12.75", "", "3"),
            DEFAULT_DETAIL,
        )
        .unwrap();
        store.save(&records).await.unwrap();
        assert_eq!(store.load().await, records);

        // And once more through a second save
        let again = store.load().await;
        store.save(&again).await.unwrap();
        assert_eq!(store.load().await, records);
    }

    #[tokio::test]
    async fn test_save_writes_versioned_document() {
        let (store, slot) = store();
        store.save(&seed_records()).await.unwrap();
        let raw = slot.get(STORAGE_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["records"].as_array().unwrap().len(), 10);
        assert_eq!(value["records"][0]["fuel"], 1115);
    }

    #[tokio::test]
    async fn test_save_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(FileSlot::new(dir.path().join("missing")), STORAGE_KEY);
        assert!(store.save(&seed_records()).await.is_err());
    }

    #[tokio::test]
    async fn test_save_backs_up_previous_value() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join("backups");
        std::fs::create_dir(&backups).unwrap();
        let (store, _) = store();
        let store = store.with_backup(Backup::with_dir(&backups, 5));

        store.save(&seed_records()).await.unwrap();
        // Nothing to back up the first time
        assert_eq!(std::fs::read_dir(&backups).unwrap().count(), 0);

        let (records, _) = insert(&seed_records(), draft("2025-09-30", "Test"), "").unwrap();
        store.save(&records).await.unwrap();
        let files: Vec<_> = std::fs::read_dir(&backups).unwrap().collect();
        assert_eq!(files.len(), 1);
        let content = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("seed-10"));
        assert!(!content.contains("Test"));
    }

    #[test]
    fn test_insert_appends_in_order() {
        let (first, a) = insert(&[], draft("2025-09-30", "Test"), DEFAULT_DETAIL).unwrap();
        let (second, b) = insert(&first, draft("2025-09-01", "Otro"), DEFAULT_DETAIL).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], a);
        assert_eq!(second[1], b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_insert_rejects_missing_fields() {
        let records = seed_records();
        assert!(insert(&records, draft("2025-09-30", ""), DEFAULT_DETAIL).is_err());
        assert!(insert(&records, draft("", "Test"), DEFAULT_DETAIL).is_err());
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_insert_uses_default_detail() {
        let (_, record) =
            insert(&[], ExpenseDraft::new("2025-09-30", "Test"), "Gasolina").unwrap();
        assert_eq!(record.detail(), "Gasolina");
    }

    #[test]
    fn test_remove_by_id() {
        let records = seed_records();
        let removal = remove(&records, "seed-03", |r| {
            assert_eq!(r.id(), "seed-03");
            true
        })
        .unwrap();
        let Removal::Removed(next, removed) = removal else {
            panic!("expected removal");
        };
        assert_eq!(removed.id(), "seed-03");
        assert_eq!(next.len(), 9);
        assert!(next.iter().all(|r| r.id() != "seed-03"));
        // Relative order of the rest is kept
        assert_eq!(next[2].id(), "seed-04");
    }

    #[test]
    fn test_remove_declined() {
        let records = seed_records();
        assert_eq!(remove(&records, "seed-03", |_| false).unwrap(), Removal::Declined);
    }

    #[test]
    fn test_remove_unknown_id() {
        let err = remove(&seed_records(), "nope", |_| true).unwrap_err();
        assert!(err.to_string().contains("Expense not found"));
    }

    #[test]
    fn test_remove_does_not_depend_on_position() {
        let (records, target) =
            insert(&seed_records(), draft("2025-09-30", "Test"), DEFAULT_DETAIL).unwrap();
        // Removing an earlier record shifts positions; the id still finds the right record
        let Removal::Removed(records, _) = remove(&records, "seed-01", |_| true).unwrap() else {
            panic!("expected removal");
        };
        let Removal::Removed(records, removed) =
            remove(&records, target.id(), |_| true).unwrap()
        else {
            panic!("expected removal");
        };
        assert_eq!(removed, target);
        assert_eq!(records.len(), 9);
    }
}
