//! Capped, newest-first record lists on top of a `KeyValueStore`.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::HistoryError;
use crate::kv::KeyValueStore;
use crate::record::SkinConditionRecord;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// The two independent record lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryList {
    /// Saved automatically after each image analysis.
    AutoAnalysis,
    /// Entered by hand from the condition form.
    Manual,
}

impl HistoryList {
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::AutoAnalysis => "skinAnalysisHistory",
            Self::Manual => "skinConditions",
        }
    }

    /// Whether records in this list can be deleted one by one.
    pub fn allows_removal(&self) -> bool {
        matches!(self, Self::Manual)
    }

    /// Maximum number of retained records.
    pub fn cap(&self) -> usize {
        match self {
            Self::AutoAnalysis => 20,
            Self::Manual => 10,
        }
    }
}

/// Change notification. Carries no records; subscribers re-`load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Updated(HistoryList),
}

/// Persisted skin-condition history.
///
/// Each mutation is a full read-modify-write of one list, serialized by an
/// in-process lock. Other processes sharing the same storage race
/// last-write-wins.
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    events: broadcast::Sender<HistoryEvent>,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            kv,
            write_lock: Mutex::new(()),
            events,
        }
    }

    /// Receive `HistoryEvent`s for every successful mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// Read `list`. Missing, unreadable or malformed data yields an empty list.
    pub fn load(&self, list: HistoryList) -> Vec<SkinConditionRecord> {
        let key = list.storage_key();
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history '{}': {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Discarding malformed history '{}': {}", key, e);
                Vec::new()
            }
        }
    }

    /// Prepend `record` to `list`, evicting the oldest entries beyond the cap.
    ///
    /// Returns `Ok(false)` without touching storage when the record's
    /// condition is empty or whitespace.
    ///
    /// # Errors
    /// Returns an error if the updated list cannot be written.
    pub fn append(
        &self,
        mut record: SkinConditionRecord,
        list: HistoryList,
    ) -> Result<bool, HistoryError> {
        if !record.is_valid() {
            tracing::debug!("Ignoring record with empty condition for {:?}", list);
            return Ok(false);
        }

        {
            let _guard = self.write_lock.lock();
            let mut records = self.load(list);

            if records.iter().any(|r| r.id == record.id) {
                record.id = next_free_id(&records, record.id);
            }

            records.insert(0, record);
            records.truncate(list.cap());
            self.persist(list, &records)?;
            tracing::info!(
                "Saved record to '{}' ({} entries)",
                list.storage_key(),
                records.len()
            );
        }

        self.notify(list);
        Ok(true)
    }

    /// Remove the record with `id` from `list`, preserving the order of the rest.
    ///
    /// Only the manual list supports removal; auto-saved analyses age out
    /// through the cap. Returns whether a record was removed; storage is
    /// untouched otherwise.
    ///
    /// # Errors
    /// Returns an error if the updated list cannot be written.
    pub fn remove(&self, list: HistoryList, id: i64) -> Result<bool, HistoryError> {
        if !list.allows_removal() {
            tracing::warn!("Records in '{}' cannot be deleted", list.storage_key());
            return Ok(false);
        }

        {
            let _guard = self.write_lock.lock();
            let mut records = self.load(list);
            let before = records.len();
            records.retain(|r| r.id != id);

            if records.len() == before {
                tracing::debug!("No record {} in '{}'", id, list.storage_key());
                return Ok(false);
            }

            self.persist(list, &records)?;
            tracing::info!("Deleted record {} from '{}'", id, list.storage_key());
        }

        self.notify(list);
        Ok(true)
    }

    fn persist(&self, list: HistoryList, records: &[SkinConditionRecord]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(records)?;
        self.kv.set(list.storage_key(), &json)
    }

    fn notify(&self, list: HistoryList) {
        // No subscribers is not an error.
        let _ = self.events.send(HistoryEvent::Updated(list));
    }
}

/// An id above every stored one, or below them all when that would overflow.
fn next_free_id(records: &[SkinConditionRecord], fallback: i64) -> i64 {
    let max_id = records.iter().map(|r| r.id).max().unwrap_or(fallback);
    match max_id.checked_add(1) {
        Some(id) => id,
        None => records
            .iter()
            .map(|r| r.id)
            .min()
            .unwrap_or(fallback)
            .saturating_sub(1),
    }
}
