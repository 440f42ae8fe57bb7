//! Inventory settings
//!
//! Persisted separately from the collection, under their own key.

use serde::{Deserialize, Serialize};

use crate::filter::ItemFilter;
use crate::id::{DEFAULT_RANDOM_LEN, MAX_RANDOM_LEN};
use crate::persistence::{StorageBackend, StoreError};

/// Key of the collection blob written by the web app
pub const DEFAULT_STORAGE_KEY: &str = "mi_coleccion_items";

/// Repository configuration and view preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key the collection blob lives under
    pub storage_key: String,
    /// Random characters appended to each id
    pub id_random_len: usize,
    /// Id re-rolls before create gives up
    pub max_id_attempts: u32,
    /// View shown when the app starts
    pub default_filter: ItemFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            id_random_len: DEFAULT_RANDOM_LEN,
            max_id_attempts: 16,
            default_filter: ItemFilter::All,
        }
    }
}

impl Settings {
    /// Storage key for the settings themselves
    pub const STORAGE_KEY: &'static str = "mi_coleccion_settings";

    /// Load settings, falling back to defaults
    pub fn load(backend: &impl StorageBackend) -> Self {
        match backend.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save(&self, backend: &mut impl StorageBackend) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        backend.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp values that would make the repository unusable
    fn sanitized(mut self) -> Self {
        if self.storage_key.trim().is_empty() {
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        self.id_random_len = self.id_random_len.clamp(1, MAX_RANDOM_LEN);
        self.max_id_attempts = self.max_id_attempts.max(1);
        self
    }
}
