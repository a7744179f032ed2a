//! Shelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP server.

pub mod modules;

use anyhow::Context;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::books::{
    models::{Book, BookId},
    store::BookStore,
};

/// Build the registry with every application module registered
pub fn bootstrap(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings).context("failed to register modules")?;
    Ok(registry)
}

/// Run the service until shutdown: init, start, serve, stop
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = bootstrap(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
