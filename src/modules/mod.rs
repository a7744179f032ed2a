pub mod books;

use shelf_kernel::{settings::Settings, ModuleRegistry};

/// Register every application module with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let store = books::store::BookStore::from_settings(&settings.books)?;
    registry.register(books::create_module(store));
    Ok(())
}
