//! Item repository
//!
//! Owns the ordered in-memory collection and flushes the whole collection to
//! the persistent store after every successful mutation. Every mutating call
//! runs validate, mutate, persist before returning.

use std::collections::HashSet;

use crate::error::{RepositoryError, RepositoryResult};
use crate::filter::ItemFilter;
use crate::id::IdGenerator;
use crate::item::{Item, ItemFields};
use crate::persistence::{PersistentStore, StorageBackend};
use crate::platform::{Clock, SystemClock, iso_timestamp};
use crate::prompt::{CLEAR_MESSAGE, ConfirmPrompt, DELETE_MESSAGE};
use crate::settings::Settings;

pub struct ItemRepository<B> {
    items: Vec<Item>,
    store: PersistentStore<B>,
    ids: IdGenerator,
    clock: Box<dyn Clock>,
    /// Every id loaded or handed out during this session
    issued: HashSet<String>,
    max_id_attempts: u32,
}

impl<B: StorageBackend> ItemRepository<B> {
    /// Open the collection under the default key
    pub fn new(backend: B) -> Self {
        Self::with_settings(backend, &Settings::default())
    }

    pub fn with_settings(backend: B, settings: &Settings) -> Self {
        Self::from_parts(
            PersistentStore::new(backend, settings.storage_key.clone()),
            IdGenerator::from_entropy(settings.id_random_len),
            Box::new(SystemClock),
            settings.max_id_attempts,
        )
    }

    /// Assemble a repository from explicit parts and load the collection once
    pub fn from_parts(
        store: PersistentStore<B>,
        ids: IdGenerator,
        clock: Box<dyn Clock>,
        max_id_attempts: u32,
    ) -> Self {
        let items = store.load();
        let issued = items.iter().map(|item| item.id.clone()).collect();
        Self {
            items,
            store,
            ids,
            clock,
            issued,
            max_id_attempts: max_id_attempts.max(1),
        }
    }

    pub fn store(&self) -> &PersistentStore<B> {
        &self.store
    }

    /// Mutable access to the store, e.g. to reconfigure the backend before a
    /// [`flush`](Self::flush)
    pub fn store_mut(&mut self) -> &mut PersistentStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> PersistentStore<B> {
        self.store
    }

    /// The whole collection in order
    pub fn list(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items satisfying `predicate`, in collection order
    pub fn filter<P>(&self, predicate: P) -> Vec<Item>
    where
        P: Fn(&Item) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).cloned().collect()
    }

    pub fn filter_by(&self, filter: &ItemFilter) -> Vec<Item> {
        self.filter(|item| filter.matches(item))
    }

    /// Validate, assign id and creation time, append, persist
    pub fn create(&mut self, fields: ItemFields) -> RepositoryResult<Item> {
        let title = required(fields.title.as_deref(), "title")?;
        let category = required(fields.category.as_deref(), "category")?;
        let id = self.fresh_id()?;

        let mut item = Item {
            id,
            title,
            creator: String::new(),
            category,
            quantity: 1,
            acquired: String::new(),
            notes: String::new(),
            favorite: false,
            created_at: iso_timestamp(self.clock.now()),
        };
        item.merge(&fields);

        self.issued.insert(item.id.clone());
        self.items.push(item.clone());
        log::info!("Created item {} ('{}')", item.id, item.title);

        self.persist()?;
        Ok(item)
    }

    /// Merge the supplied fields into an existing item
    pub fn update(&mut self, id: &str, fields: ItemFields) -> RepositoryResult<Item> {
        let idx = self
            .position(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if fields.title.is_some() {
            required(fields.title.as_deref(), "title")?;
        }
        if fields.category.is_some() {
            required(fields.category.as_deref(), "category")?;
        }

        let item = &mut self.items[idx];
        item.merge(&fields);
        let updated = item.clone();
        log::info!("Updated item {}", id);

        self.persist()?;
        Ok(updated)
    }

    /// Remove the item if present. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> RepositoryResult<bool> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            log::info!("Deleted item {}", id);
        }

        self.persist()?;
        Ok(removed)
    }

    /// Drop every item
    pub fn clear(&mut self) -> RepositoryResult<()> {
        let count = self.items.len();
        self.items.clear();
        log::info!("Cleared inventory ({} items)", count);

        self.persist()
    }

    /// [`delete`](Self::delete) after the user confirms; declining is a no-op
    pub fn delete_confirmed(
        &mut self,
        id: &str,
        prompt: &mut impl ConfirmPrompt,
    ) -> RepositoryResult<bool> {
        if !prompt.confirm(DELETE_MESSAGE) {
            return Ok(false);
        }
        self.delete(id)
    }

    /// [`clear`](Self::clear) after the user confirms. Returns whether it ran.
    pub fn clear_confirmed(&mut self, prompt: &mut impl ConfirmPrompt) -> RepositoryResult<bool> {
        if !prompt.confirm(CLEAR_MESSAGE) {
            return Ok(false);
        }
        self.clear()?;
        Ok(true)
    }

    /// Write the current collection again, e.g. after `StorageUnavailable`
    pub fn flush(&mut self) -> RepositoryResult<()> {
        self.persist()
    }

    fn persist(&mut self) -> RepositoryResult<()> {
        self.store.save(&self.items).map_err(|e| {
            log::warn!("Inventory not saved, memory is ahead of storage: {}", e);
            RepositoryError::from(e)
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn fresh_id(&mut self) -> RepositoryResult<String> {
        let now_ms = self.clock.now_millis();
        for _ in 0..self.max_id_attempts {
            let id = self.ids.next_id(now_ms);
            if !self.issued.contains(&id) {
                return Ok(id);
            }
            log::warn!("Id collision on {}, re-rolling", id);
        }
        Err(RepositoryError::IdExhausted {
            attempts: self.max_id_attempts,
        })
    }
}

/// Trimmed, non-empty value or a validation error naming `field`
fn required(value: Option<&str>, field: &'static str) -> RepositoryResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RepositoryError::Validation { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, StorageError};
    use crate::platform::SteppingClock;
    use crate::prompt::{AlwaysConfirm, NeverConfirm};
    use crate::settings::DEFAULT_STORAGE_KEY;
    use proptest::prelude::*;
    use serde_json::json;

    const START_MS: i64 = 1_714_558_830_123;

    fn repo_with(backend: MemoryStorage) -> ItemRepository<MemoryStorage> {
        ItemRepository::from_parts(
            PersistentStore::new(backend, DEFAULT_STORAGE_KEY),
            IdGenerator::seeded(7, 4),
            Box::new(SteppingClock::new(START_MS, 1)),
            16,
        )
    }

    fn repo() -> ItemRepository<MemoryStorage> {
        repo_with(MemoryStorage::new())
    }

    fn writes(repo: &ItemRepository<MemoryStorage>) -> usize {
        repo.store().backend().writes()
    }

    fn persisted(repo: &ItemRepository<MemoryStorage>) -> Vec<Item> {
        repo.store().load()
    }

    #[test]
    fn test_create_assigns_identity_and_persists() {
        let mut repo = repo();
        let item = repo.create(ItemFields::new("Dune", "book")).unwrap();

        assert_eq!(repo.len(), 1);
        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, "2024-05-01T10:20:30.124Z");
        assert_eq!(item.quantity, 1);
        assert!(!item.favorite);
        assert_eq!(persisted(&repo), repo.list());
    }

    #[test]
    fn test_create_normalizes_bad_quantity() {
        let mut repo = repo();
        let item = repo
            .create(ItemFields {
                quantity: Some(json!("abc")),
                ..ItemFields::new("Dune", "book")
            })
            .unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_create_with_empty_title_fails_without_write() {
        let mut repo = repo();
        repo.create(ItemFields::new("Catan", "game")).unwrap();
        let writes_before = writes(&repo);

        for title in ["", "   "] {
            let err = repo.create(ItemFields::new(title, "book")).unwrap_err();
            assert!(matches!(err, RepositoryError::Validation { field: "title" }));
        }
        let err = repo
            .create(ItemFields {
                title: Some("Dune".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { field: "category" }));

        assert_eq!(repo.len(), 1);
        assert_eq!(writes(&repo), writes_before);
    }

    #[test]
    fn test_create_stores_optional_fields() {
        let mut repo = repo();
        let item = repo
            .create(ItemFields {
                creator: Some(" Frank Herbert ".into()),
                quantity: Some(json!(3)),
                acquired: Some("2023-02-30".into()),
                notes: Some("first edition".into()),
                favorite: Some(true),
                ..ItemFields::new(" Dune ", "book")
            })
            .unwrap();

        assert_eq!(item.title, "Dune");
        assert_eq!(item.creator, "Frank Herbert");
        assert_eq!(item.quantity, 3);
        // Stored verbatim, no calendar checks
        assert_eq!(item.acquired, "2023-02-30");
        assert!(item.favorite);
    }

    #[test]
    fn test_create_rerolls_on_collision() {
        // Pre-seed the store with the id the generator will produce first
        let first = IdGenerator::seeded(7, 4).next_id(START_MS);
        let existing = Item {
            id: first.clone(),
            title: "Existing".into(),
            creator: String::new(),
            category: "other".into(),
            quantity: 1,
            acquired: String::new(),
            notes: String::new(),
            favorite: false,
            created_at: "2024-01-01T00:00:00.000Z".into(),
        };
        let blob = serde_json::to_string(&[existing]).unwrap();
        let mut repo = repo_with(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, &blob));

        let item = repo.create(ItemFields::new("New", "book")).unwrap();
        assert_ne!(item.id, first);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_create_gives_up_when_ids_exhausted() {
        // No random component and a frozen clock: every candidate is identical
        let mut repo = ItemRepository::from_parts(
            PersistentStore::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY),
            IdGenerator::seeded(1, 0),
            Box::new(SteppingClock::fixed(START_MS)),
            3,
        );
        repo.create(ItemFields::new("One", "book")).unwrap();

        let err = repo.create(ItemFields::new("Two", "book")).unwrap_err();
        assert!(matches!(err, RepositoryError::IdExhausted { attempts: 3 }));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_deleted_ids_are_not_reissued() {
        let mut repo = ItemRepository::from_parts(
            PersistentStore::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY),
            IdGenerator::seeded(1, 0),
            Box::new(SteppingClock::fixed(START_MS)),
            3,
        );
        let item = repo.create(ItemFields::new("One", "book")).unwrap();
        repo.delete(&item.id).unwrap();
        assert!(repo.create(ItemFields::new("Two", "book")).is_err());
    }

    #[test]
    fn test_update_favorite_changes_only_favorite() {
        let mut repo = repo();
        let original = repo
            .create(ItemFields {
                creator: Some("Herbert".into()),
                quantity: Some(json!(2)),
                ..ItemFields::new("Dune", "book")
            })
            .unwrap();

        let updated = repo.update(&original.id, ItemFields::favorite(true)).unwrap();

        let mut expected = original.clone();
        expected.favorite = true;
        assert_eq!(updated, expected);
        assert_eq!(repo.get(&original.id), Some(&expected));
        assert_eq!(persisted(&repo), repo.list());
    }

    #[test]
    fn test_update_ignores_identity_keys() {
        let mut repo = repo();
        let original = repo.create(ItemFields::new("Dune", "book")).unwrap();
        let patch: ItemFields = serde_json::from_value(json!({
            "id": "forged",
            "createdAt": "1970-01-01T00:00:00.000Z",
            "quantity": "7"
        }))
        .unwrap();

        let updated = repo.update(&original.id, patch).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.quantity, 7);
    }

    #[test]
    fn test_update_preserves_position() {
        let mut repo = repo();
        let a = repo.create(ItemFields::new("A", "book")).unwrap();
        let b = repo.create(ItemFields::new("B", "book")).unwrap();
        let c = repo.create(ItemFields::new("C", "book")).unwrap();

        repo.update(&b.id, ItemFields::new("B2", "game")).unwrap();
        let ids: Vec<_> = repo.list().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, [a.id, b.id, c.id]);
        assert_eq!(repo.list()[1].title, "B2");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut repo = repo();
        repo.create(ItemFields::new("A", "book")).unwrap();
        let before = repo.list().to_vec();
        let writes_before = writes(&repo);

        let err = repo.update("missing", ItemFields::favorite(true)).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(ref id) if id == "missing"));
        assert_eq!(repo.list(), before);
        assert_eq!(writes(&repo), writes_before);
    }

    #[test]
    fn test_update_cannot_blank_title() {
        let mut repo = repo();
        let item = repo.create(ItemFields::new("A", "book")).unwrap();
        let err = repo
            .update(
                &item.id,
                ItemFields {
                    title: Some(" ".into()),
                    favorite: Some(true),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { field: "title" }));
        assert_eq!(repo.get(&item.id), Some(&item));
    }

    #[test]
    fn test_delete_present_and_absent() {
        let mut repo = repo();
        let a = repo.create(ItemFields::new("A", "book")).unwrap();
        let b = repo.create(ItemFields::new("B", "book")).unwrap();

        assert!(repo.delete(&a.id).unwrap());
        assert_eq!(repo.len(), 1);
        assert!(repo.get(&a.id).is_none());
        assert_eq!(persisted(&repo), vec![b.clone()]);

        let before = repo.list().to_vec();
        assert!(!repo.delete(&a.id).unwrap());
        assert_eq!(repo.list(), before);
    }

    #[test]
    fn test_filter_favorites_and_all() {
        let mut repo = repo();
        assert!(repo.filter_by(&ItemFilter::Favorites).is_empty());

        let a = repo.create(ItemFields::new("A", "book")).unwrap();
        let b = repo
            .create(ItemFields {
                favorite: Some(true),
                ..ItemFields::new("B", "game")
            })
            .unwrap();
        let c = repo.create(ItemFields::new("C", "book")).unwrap();
        repo.update(&c.id, ItemFields::favorite(true)).unwrap();

        let favorites: Vec<_> = repo
            .filter_by(&ItemFilter::Favorites)
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(favorites, [b.id.clone(), c.id.clone()]);
        assert_eq!(repo.filter_by(&ItemFilter::All), repo.list());
        assert_eq!(repo.filter(|i| i.category == "book").len(), 2);
        assert_eq!(repo.list()[0].id, a.id);
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let mut repo = repo();
        repo.create(ItemFields::new("A", "book")).unwrap();
        repo.create(ItemFields::new("B", "book")).unwrap();

        repo.clear().unwrap();
        assert!(repo.is_empty());
        assert_eq!(repo.store().backend().raw(DEFAULT_STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_reopen_sees_persisted_state() {
        let mut repo = repo();
        let a = repo.create(ItemFields::new("A", "book")).unwrap();
        repo.create(ItemFields::new("B", "book")).unwrap();
        repo.update(&a.id, ItemFields::favorite(true)).unwrap();
        let snapshot = repo.list().to_vec();

        let backend = repo.into_store().into_backend();
        let reopened = repo_with(backend);
        assert_eq!(reopened.list(), snapshot);
    }

    #[test]
    fn test_malformed_store_opens_empty() {
        let repo = repo_with(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, "{\"not\":\"a list\"}"));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_memory_ahead() {
        let mut backend = MemoryStorage::new();
        backend.set_available(false);
        let mut repo = repo_with(backend);

        let err = repo.create(ItemFields::new("A", "book")).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::StorageUnavailable(StorageError::Unavailable(_))
        ));
        // No rollback
        assert_eq!(repo.len(), 1);
        assert!(persisted(&repo).is_empty());
    }

    #[test]
    fn test_flush_recovers_after_storage_returns() {
        let mut backend = MemoryStorage::new();
        backend.set_available(false);
        let mut repo = repo_with(backend);

        let a = repo.create(ItemFields::new("A", "book")).unwrap_err();
        assert!(matches!(a, RepositoryError::StorageUnavailable(_)));
        let b = repo.create(ItemFields::new("B", "game")).unwrap_err();
        assert!(matches!(b, RepositoryError::StorageUnavailable(_)));
        assert!(persisted(&repo).is_empty());

        // Still down: flush fails and memory stays ahead
        assert!(repo.flush().is_err());
        assert_eq!(repo.len(), 2);

        repo.store_mut().backend_mut().set_available(true);
        repo.flush().unwrap();

        let stored = persisted(&repo);
        assert_eq!(stored, repo.list());
        let titles: Vec<_> = stored.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn test_confirmed_operations() {
        let mut repo = repo();
        let a = repo.create(ItemFields::new("A", "book")).unwrap();
        repo.create(ItemFields::new("B", "book")).unwrap();
        let writes_before = writes(&repo);

        assert!(!repo.delete_confirmed(&a.id, &mut NeverConfirm).unwrap());
        assert!(!repo.clear_confirmed(&mut NeverConfirm).unwrap());
        assert_eq!(repo.len(), 2);
        assert_eq!(writes(&repo), writes_before);

        let mut asked = Vec::new();
        let mut record = |message: &str| {
            asked.push(message.to_string());
            true
        };
        assert!(repo.delete_confirmed(&a.id, &mut record).unwrap());
        assert_eq!(asked, [DELETE_MESSAGE]);

        assert!(repo.clear_confirmed(&mut AlwaysConfirm).unwrap());
        assert!(repo.is_empty());
    }

    proptest! {
        #[test]
        fn prop_creates_yield_distinct_ids(n in 1usize..60, seed in any::<u64>()) {
            // Two random characters and a frozen clock force frequent collisions
            let mut repo = ItemRepository::from_parts(
                PersistentStore::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY),
                IdGenerator::seeded(seed, 2),
                Box::new(SteppingClock::fixed(START_MS)),
                10_000,
            );
            for i in 0..n {
                repo.create(ItemFields::new(format!("item {i}"), "other")).unwrap();
            }
            let ids: HashSet<_> = repo.list().iter().map(|i| i.id.clone()).collect();
            prop_assert_eq!(ids.len(), n);
            prop_assert_eq!(repo.store().load(), repo.list().to_vec());
        }

        #[test]
        fn prop_delete_removes_exactly_one(n in 1usize..20, pick in any::<prop::sample::Index>()) {
            let mut repo = repo();
            for i in 0..n {
                repo.create(ItemFields::new(format!("item {i}"), "book")).unwrap();
            }
            let victim = repo.list()[pick.index(n)].id.clone();
            prop_assert!(repo.delete(&victim).unwrap());
            prop_assert_eq!(repo.len(), n - 1);
            prop_assert!(repo.get(&victim).is_none());
        }
    }
}
