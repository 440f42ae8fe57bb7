//! Raw key/value storage beneath the persistent store

use std::collections::HashMap;

use thiserror::Error;

/// Failure of the underlying key/value facility
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is disabled or not reachable at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage read failed: {0}")]
    Read(String),
    /// Write rejected, e.g. quota exceeded
    #[error("storage write failed: {0}")]
    Write(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Whole-value get/set by string key
///
/// Implementations replace values atomically: a reader sees either the old
/// value or the new one, never a mix.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Use an opened backend, or fall back to an unavailable one
///
/// Opening storage can fail (browser private mode, blocked cookies). The
/// repository still works over the fallback: it loads empty and every save
/// reports the storage as unavailable.
pub fn or_unavailable<B>(opened: Result<B, StorageError>) -> Box<dyn StorageBackend>
where
    B: StorageBackend + 'static,
{
    match opened {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            log::warn!("Storage could not be opened, changes will not persist: {}", e);
            Box::new(MemoryStorage::unavailable())
        }
    }
}

/// In-process backend
///
/// Can be switched to "unavailable" to simulate a full or disabled store, and
/// counts successful writes.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    available: bool,
    writes: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            available: true,
            writes: 0,
        }
    }

    /// Backend that reads nothing and rejects every write
    pub fn unavailable() -> Self {
        let mut storage = Self::new();
        storage.available = false;
        storage
    }

    /// Backend pre-seeded with one raw value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }

    /// When false, every write and remove fails with [`StorageError::Unavailable`]
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of successful set/remove calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw stored value, bypassing availability
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable("memory storage disabled".to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable("memory storage disabled".to_string()));
        }
        self.values.remove(key);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        assert_eq!(storage.writes(), 3);
    }

    #[test]
    fn test_memory_storage_unavailable_rejects_writes() {
        let mut storage = MemoryStorage::with_value("k", "old");
        storage.set_available(false);

        assert!(matches!(
            storage.set("k", "new"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.raw("k"), Some("old"));
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn test_failed_open_falls_back_to_unavailable() {
        use crate::item::ItemFields;
        use crate::repository::ItemRepository;
        use crate::RepositoryError;

        let opened: Result<MemoryStorage, _> =
            Err(StorageError::Unavailable("localStorage disabled".to_string()));
        let mut repo = ItemRepository::new(or_unavailable(opened));

        assert!(repo.is_empty());
        let err = repo.create(ItemFields::new("Dune", "book")).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::StorageUnavailable(StorageError::Unavailable(_))
        ));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_successful_open_is_used() {
        let mut backend = or_unavailable(Ok(MemoryStorage::new()));
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut storage: Box<dyn StorageBackend> = Box::new(MemoryStorage::new());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
