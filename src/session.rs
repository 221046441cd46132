//! The state of one `gastos` run: the loaded records, the month being looked at, and the store
//! that changes are written back to.

use crate::model::{month_key_of, ExpenseDraft, ExpenseRecord, MonthKey};
use crate::report::{monthly_report, months_with_records, MonthlyReport};
use crate::error::{ErrorType, IntoResult};
use crate::store::{self, RecordStore, Removal, SlotState};
use crate::Result;
use anyhow::anyhow;
use tracing::{debug, info, warn};

/// Owns the in-memory expense list and the selected month.
///
/// Every mutation replaces the whole list and is then saved. When saving fails the change is kept
/// in memory and reported through `Change::saved`. A session opened over a document written by a
/// newer version of gastos is read-only.
#[derive(Debug)]
pub struct Session {
    store: RecordStore,
    records: Vec<ExpenseRecord>,
    selected: MonthKey,
    default_detail: String,
    newer_version: Option<u32>,
}

/// A record that was added or removed, and whether the new list reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub record: ExpenseRecord,
    pub saved: bool,
}

impl Session {
    /// Loads the records from `store` and selects the current month. Ids given to stored records
    /// that had none are saved right away so that they stay valid in later runs.
    pub async fn open(store: RecordStore, default_detail: impl Into<String>) -> Self {
        let loaded = store.load_document().await;
        let mut newer_version = None;
        match loaded.state {
            SlotState::Repaired => match store.save(&loaded.records).await {
                Ok(()) => info!("Saved new ids for stored expenses that had none"),
                Err(e) => warn!("Unable to save the new expense ids: {e:#}"),
            },
            SlotState::Newer(version) => newer_version = Some(version),
            SlotState::Empty | SlotState::Current | SlotState::Unreadable => {}
        }
        Self {
            store,
            records: loaded.records,
            selected: MonthKey::current(),
            default_detail: default_detail.into(),
            newer_version,
        }
    }

    /// True when the stored document belongs to a newer version of gastos and must not be changed.
    pub fn is_read_only(&self) -> bool {
        self.newer_version.is_some()
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn selected(&self) -> MonthKey {
        self.selected
    }

    pub fn select(&mut self, month: MonthKey) {
        debug!("Selected month {month}");
        self.selected = month;
    }

    /// Validates and appends a new expense, then saves. The selection moves to the month of the new
    /// record.
    ///
    /// # Errors
    /// - Returns a validation error if the draft is rejected. Neither the records nor the selection
    ///   change.
    /// - Returns a storage error if the session is read-only.
    pub async fn add(&mut self, draft: ExpenseDraft) -> Result<Change> {
        self.ensure_writable()?;
        let (records, record) = store::insert(&self.records, draft, &self.default_detail)?;
        self.records = records;
        info!("Added expense {} on {}", record.id(), record.date());
        match month_key_of(record.date()) {
            Some(month) => self.select(month),
            None => warn!(
                "The date '{}' is not a calendar date, the expense will not show in any month",
                record.date()
            ),
        }
        let saved = self.save().await;
        Ok(Change { record, saved })
    }

    /// Removes the expense with `id` if `confirm` approves, then saves. Returns `None` when the
    /// user declined.
    ///
    /// # Errors
    /// - Returns an error if no expense has `id`.
    /// - Returns a storage error if the session is read-only.
    pub async fn delete<F>(&mut self, id: &str, confirm: F) -> Result<Option<Change>>
    where
        F: FnOnce(&ExpenseRecord) -> bool,
    {
        self.ensure_writable()?;
        match store::remove(&self.records, id, confirm)? {
            Removal::Declined => {
                info!("Kept expense {id}");
                Ok(None)
            }
            Removal::Removed(records, record) => {
                self.records = records;
                info!("Deleted expense {id}");
                let saved = self.save().await;
                Ok(Some(Change { record, saved }))
            }
        }
    }

    /// The report for the selected month.
    pub fn report(&self) -> MonthlyReport {
        monthly_report(&self.records, self.selected)
    }

    pub fn months(&self) -> Vec<MonthKey> {
        months_with_records(&self.records)
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.newer_version {
            Some(version) => Err(anyhow!(
                "The stored expenses were written by a newer version of gastos (document version \
                {version}) and cannot be changed by this one"
            ))
            .pub_result(ErrorType::Storage),
            None => Ok(()),
        }
    }

    async fn save(&self) -> bool {
        match self.store.save(&self.records).await {
            Ok(()) => true,
            Err(e) => {
                warn!("The change was not saved and will be lost on exit: {e:#}");
                false
            }
        }
    }
}
