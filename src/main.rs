//! Collection Inventory entry point
//!
//! On the web the page drives the library through `web::Inventory`. Natively
//! this prints the inventory stored in the data directory
//! (`COLLECTION_DATA_DIR`, default `./data`).

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use collection_inventory::platform::FileStorage;
    use collection_inventory::{ItemRepository, Settings};

    env_logger::init();

    let dir = std::env::var("COLLECTION_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    log::info!("Collection inventory (native) reading {}", dir);

    let backend = FileStorage::new(&dir);
    let settings = Settings::load(&backend);
    let repo = ItemRepository::with_settings(backend, &settings);

    let items = repo.filter_by(&settings.default_filter);
    if items.is_empty() {
        println!("No items ({} view).", settings.default_filter.as_str());
        return;
    }

    for item in &items {
        let acquired = if item.acquired.is_empty() {
            "-"
        } else {
            item.acquired.as_str()
        };
        println!(
            "{:<12} {:<32} {:<8} x{:<4} {:<10} {}",
            item.id,
            item.title,
            item.category,
            item.quantity,
            acquired,
            if item.favorite { "*" } else { "" }
        );
    }
    println!("{} of {} items", items.len(), repo.len());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
