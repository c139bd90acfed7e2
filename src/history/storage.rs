use super::model::HistoryEntry;
use crate::Result;
use crate::store::{SharedStore, StoreKey, json};

/// Keep at most the 100 most recent entries
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// History list persisted under [`StoreKey::History`]
///
/// # Order
/// Entries are kept newest first. Every mutation is a full read-modify-write
/// done under the store's exclusive lock, so concurrent recorders never lose
/// each other's entries.
#[derive(Clone)]
pub struct HistoryStorage {
    store: SharedStore,
}

impl HistoryStorage {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All entries, newest first. A corrupt history reads as empty.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        json::load(self.store.as_ref(), StoreKey::History)
    }

    /// The first `n` entries (the most recent ones)
    pub fn head(&self, n: usize) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.list()?;
        entries.truncate(n);
        Ok(entries)
    }

    pub fn get(&self, id: i64) -> Result<Option<HistoryEntry>> {
        Ok(self.list()?.into_iter().find(|e| e.id == id))
    }

    /// Insert at the front, evicting from the tail beyond [`MAX_HISTORY_ENTRIES`].
    pub fn prepend(&self, entry: HistoryEntry) -> Result<()> {
        json::modify(
            self.store.as_ref(),
            StoreKey::History,
            |entries: &mut Vec<HistoryEntry>| {
                entries.insert(0, entry);
                entries.truncate(MAX_HISTORY_ENTRIES);
                Ok(())
            },
        )
    }

    /// Returns whether an entry was removed
    pub fn delete(&self, id: i64) -> Result<bool> {
        json::modify(
            self.store.as_ref(),
            StoreKey::History,
            |entries: &mut Vec<HistoryEntry>| {
                let before = entries.len();
                entries.retain(|e| e.id != id);
                Ok(entries.len() != before)
            },
        )
    }

    /// Remove the whole history key
    pub fn clear(&self) -> Result<()> {
        self.store.remove(StoreKey::History)
    }
}
