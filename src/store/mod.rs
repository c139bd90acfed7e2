//! Key-value persistence for history, collections, the retry slot and preferences.
//!
//! Every value is a JSON document stored under one of a fixed set of keys.
//! Callers never see corrupt data: a value that fails to decode is treated as
//! absent and replaced on the next write.

pub mod file;
pub mod json;

use std::sync::Arc;

use crate::Result;

pub use file::FileStore;

/// Fixed keys of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    History,
    Collections,
    RetryBuffer,
    Preferences,
}

impl StoreKey {
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKey::History => "history.json",
            StoreKey::Collections => "collections.json",
            StoreKey::RetryBuffer => "retry.json",
            StoreKey::Preferences => "preferences.json",
        }
    }
}

/// A string-valued store addressed by [`StoreKey`].
///
/// `update` and `take` are atomic with respect to other users of the same
/// store, including other processes sharing a [`FileStore`] directory.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>>;

    fn set(&self, key: StoreKey, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: StoreKey) -> Result<()>;

    /// Read the value and delete the key in one step.
    fn take(&self, key: StoreKey) -> Result<Option<String>>;

    /// Read-modify-write under an exclusive lock.
    ///
    /// The closure receives the current value; `Some` replaces it, `None`
    /// removes the key. If the closure fails nothing is written.
    fn update(
        &self,
        key: StoreKey,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;
