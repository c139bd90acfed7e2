use super::model::{Collection, SaveTarget, SavedRequest};
use crate::error::ReqlabError;
use crate::http::RequestModel;
use crate::i18n::Notice;
use crate::store::{SharedStore, StoreKey, json};
use crate::Result;
use tracing::debug;

/// Collections persisted under [`StoreKey::Collections`]
///
/// Every mutation rewrites the whole list under the store's exclusive lock.
/// Validation always runs before the lock is taken, so a rejected call never
/// touches the store.
#[derive(Clone)]
pub struct CollectionStorage {
    store: SharedStore,
}

impl CollectionStorage {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Collection>> {
        json::load(self.store.as_ref(), StoreKey::Collections)
    }

    pub fn get(&self, id: i64) -> Result<Option<Collection>> {
        Ok(self.list()?.into_iter().find(|c| c.id == id))
    }

    pub fn find_request(&self, collection_id: i64, request_id: i64) -> Result<Option<SavedRequest>> {
        Ok(self
            .get(collection_id)?
            .and_then(|c| c.find_request(request_id).cloned()))
    }

    /// Create an empty collection
    pub fn create(&self, name: &str, description: &str) -> Result<Collection> {
        let name = required(name, Notice::CollectionNameRequired)?;
        let collection = Collection::new(name, description.trim());

        json::modify(
            self.store.as_ref(),
            StoreKey::Collections,
            |collections: &mut Vec<Collection>| {
                collections.push(collection.clone());
                Ok(())
            },
        )?;

        debug!("Created collection {} ({})", collection.name, collection.id);
        Ok(collection)
    }

    /// Returns whether a collection was removed. Deletion is permanent.
    pub fn delete(&self, id: i64) -> Result<bool> {
        json::modify(
            self.store.as_ref(),
            StoreKey::Collections,
            |collections: &mut Vec<Collection>| {
                let before = collections.len();
                collections.retain(|c| c.id != id);
                Ok(collections.len() != before)
            },
        )
    }

    /// Returns whether a saved request was removed from the collection
    pub fn delete_request(&self, collection_id: i64, request_id: i64) -> Result<bool> {
        json::modify(
            self.store.as_ref(),
            StoreKey::Collections,
            |collections: &mut Vec<Collection>| {
                let Some(collection) = collections.iter_mut().find(|c| c.id == collection_id)
                else {
                    return Ok(false);
                };
                let before = collection.requests.len();
                collection.requests.retain(|r| r.id != request_id);
                Ok(collection.requests.len() != before)
            },
        )
    }

    /// Save `request` under `api_name` into an existing or a new collection.
    pub fn save_request(
        &self,
        request: &RequestModel,
        api_name: &str,
        target: SaveTarget,
    ) -> Result<SavedRequest> {
        let api_name = required(api_name, Notice::ApiNameRequired)?;
        if let SaveTarget::New { name } = &target {
            required(name, Notice::CollectionNameRequired)?;
        }

        let saved = SavedRequest::new(api_name, request);

        json::modify(
            self.store.as_ref(),
            StoreKey::Collections,
            |collections: &mut Vec<Collection>| match &target {
                SaveTarget::Existing(id) => {
                    let collection = collections
                        .iter_mut()
                        .find(|c| c.id == *id)
                        .ok_or_else(|| ReqlabError::NotFound(format!("collection {}", id)))?;
                    collection.requests.push(saved.clone());
                    Ok(())
                }
                SaveTarget::New { name } => {
                    let mut collection = Collection::new(name.trim(), "");
                    collection.requests.push(saved.clone());
                    collections.push(collection);
                    Ok(())
                }
            },
        )?;

        debug!("Saved request {} ({})", saved.name, saved.id);
        Ok(saved)
    }
}

fn required(value: &str, notice: Notice) -> Result<&str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReqlabError::Validation(notice));
    }
    Ok(value)
}
