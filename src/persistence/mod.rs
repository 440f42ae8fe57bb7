//! Save/load of the item collection
//!
//! Features:
//! - Pluggable whole-value key/value backends
//! - Single JSON blob per collection
//! - Corrupt or missing data degrades to an empty collection

pub mod backend;
pub mod store;

pub use backend::{MemoryStorage, StorageBackend, StorageError, or_unavailable};
pub use store::{PersistentStore, StoreError};
