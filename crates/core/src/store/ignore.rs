use tracing::debug;

use crate::api::UserId;

use super::{Category, RelationshipSet, RelationshipStore, StoreError};

/// Append-only log of rejected accounts.
///
/// Loaded into memory once per run; each new rejection is appended to the
/// backing file. Nothing is ever removed.
#[derive(Debug)]
pub struct IgnoreLog {
    store: RelationshipStore,
    ids: RelationshipSet,
}

impl IgnoreLog {
    pub fn load(store: &RelationshipStore) -> Result<Self, StoreError> {
        let ids = store.load(Category::Ignored)?;
        Ok(Self {
            store: store.clone(),
            ids,
        })
    }

    /// Record a rejection. Returns `true` if the id was new; known ids
    /// leave both the set and the file untouched.
    pub fn record(&mut self, id: UserId) -> Result<bool, StoreError> {
        if !self.ids.insert(id) {
            return Ok(false);
        }
        debug!(user_id = %id, "Adding account to ignore log");
        self.store.append(Category::Ignored, id)?;
        Ok(true)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &RelationshipSet {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
