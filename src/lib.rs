//! Collection Inventory - a personal collection tracker
//!
//! Core modules:
//! - `repository`: Ordered item collection with create/update/delete/filter
//! - `persistence`: Whole-collection blob storage over key/value backends
//! - `platform`: Browser/native storage and clock
//! - `id`: Time + random item identifiers
//! - `settings`: Repository configuration

pub mod error;
pub mod filter;
pub mod id;
pub mod item;
pub mod persistence;
pub mod platform;
pub mod prompt;
pub mod repository;
pub mod settings;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{RepositoryError, RepositoryResult};
pub use filter::ItemFilter;
pub use item::{Category, Item, ItemFields};
pub use persistence::{MemoryStorage, PersistentStore, StorageBackend, StorageError, StoreError};
pub use prompt::{AlwaysConfirm, ConfirmPrompt, NeverConfirm};
pub use repository::ItemRepository;
pub use settings::Settings;
