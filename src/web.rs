//! JavaScript bindings for the inventory page
//!
//! Items and field maps cross the boundary as plain JS objects with the same
//! camelCase keys as the stored blob. Failures are thrown as JS errors for
//! the page to display.

use wasm_bindgen::prelude::*;

use crate::filter::ItemFilter;
use crate::item::{Category, ItemFields};
use crate::persistence::{StorageBackend, or_unavailable};
use crate::platform::LocalStorage;
use crate::prompt::BrowserConfirm;
use crate::repository::ItemRepository;
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Collection inventory starting...");
}

/// Repository handle owned by the page
#[wasm_bindgen]
pub struct Inventory {
    repo: ItemRepository<Box<dyn StorageBackend>>,
    settings: Settings,
}

#[wasm_bindgen]
impl Inventory {
    /// Open the inventory stored in this origin's LocalStorage
    ///
    /// Never throws: with storage disabled the inventory starts empty and
    /// every change reports that it was not saved.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Inventory {
        let backend = or_unavailable(LocalStorage::open());
        let settings = Settings::load(&backend);
        let repo = ItemRepository::with_settings(backend, &settings);
        Self { repo, settings }
    }

    /// Category choices for the item form
    pub fn categories(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&Category::ALL)?)
    }

    pub fn list(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.repo.list())?)
    }

    pub fn favorites(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(
            &self.repo.filter_by(&ItemFilter::Favorites),
        )?)
    }

    /// Items for a named view (`all` or `favorites`)
    pub fn filter(&self, name: &str) -> Result<JsValue, JsError> {
        let filter = ItemFilter::from_str(name)
            .ok_or_else(|| JsError::new(&format!("unknown filter '{name}'")))?;
        Ok(serde_wasm_bindgen::to_value(&self.repo.filter_by(&filter))?)
    }

    /// Case-insensitive text search over title, creator and notes
    pub fn search(&self, query: &str) -> Result<JsValue, JsError> {
        let filter = ItemFilter::Search(query.to_string());
        Ok(serde_wasm_bindgen::to_value(&self.repo.filter_by(&filter))?)
    }

    #[wasm_bindgen(js_name = defaultFilter)]
    pub fn default_filter(&self) -> String {
        self.settings.default_filter.as_str().to_string()
    }

    /// The item with `id`, or `undefined`
    pub fn get(&self, id: &str) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.repo.get(id))?)
    }

    pub fn create(&mut self, fields: JsValue) -> Result<JsValue, JsError> {
        let fields: ItemFields = serde_wasm_bindgen::from_value(fields)?;
        let item = self.repo.create(fields)?;
        Ok(serde_wasm_bindgen::to_value(&item)?)
    }

    pub fn update(&mut self, id: &str, fields: JsValue) -> Result<JsValue, JsError> {
        let fields: ItemFields = serde_wasm_bindgen::from_value(fields)?;
        let item = self.repo.update(id, fields)?;
        Ok(serde_wasm_bindgen::to_value(&item)?)
    }

    /// Delete after `window.confirm`. Returns whether an item was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, JsError> {
        Ok(self.repo.delete_confirmed(id, &mut BrowserConfirm)?)
    }

    /// Wipe the inventory after `window.confirm`. Returns whether it ran.
    pub fn clear(&mut self) -> Result<bool, JsError> {
        Ok(self.repo.clear_confirmed(&mut BrowserConfirm)?)
    }

    /// Retry saving after a storage failure
    pub fn flush(&mut self) -> Result<(), JsError> {
        Ok(self.repo.flush()?)
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.repo.len()
    }
}
