//! Whole-collection blob persistence
//!
//! The collection is stored as a single JSON array under one fixed key.
//! Loading never fails: a missing, unreadable or malformed blob is the same
//! as having no saved data.

use std::collections::HashSet;

use thiserror::Error;

use super::backend::{StorageBackend, StorageError};
use crate::item::Item;

/// Failure to persist the collection
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Durable mapping from a fixed key to the serialized collection
#[derive(Debug)]
pub struct PersistentStore<B> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> PersistentStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Read the collection, degrading to empty on any problem
    pub fn load(&self) -> Vec<Item> {
        let json = match self.backend.get(&self.key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No saved collection under '{}', starting fresh", self.key);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Could not read '{}': {}; starting empty", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Item>>(&json) {
            Ok(items) => {
                let items = dedupe_ids(items);
                log::info!("Loaded {} items from '{}'", items.len(), self.key);
                items
            }
            Err(e) => {
                log::warn!("Discarding malformed collection under '{}': {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Replace the stored blob with the whole collection
    pub fn save(&mut self, items: &[Item]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.backend.set(&self.key, &json)?;
        log::debug!("Collection saved ({} items)", items.len());
        Ok(())
    }

    /// Remove the blob entirely
    pub fn clear_blob(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)?;
        log::info!("Saved collection '{}' removed", self.key);
        Ok(())
    }
}

/// Keep the first record for each id
fn dedupe_ids(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    let items: Vec<Item> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    if items.len() != before {
        log::warn!("Dropped {} items with duplicate ids", before - items.len());
    }
    items
}
