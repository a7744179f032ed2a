pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use shelf_kernel::{InitCtx, Module};
use utoipa::openapi::OpenApi;

use store::BookStore;

/// Books module: CRUD over the in-memory book collection
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            id_strategy = ?ctx.settings.books.id_strategy,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let (router, _) = routes::router(self.store.clone()).split_for_parts();
        router
    }

    fn openapi(&self) -> Option<OpenApi> {
        let (_, openapi) = routes::router(self.store.clone()).split_for_parts();
        Some(openapi)
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.store.len().await;
        tracing::info!(module = self.name(), books, "books module stopped");
        Ok(())
    }
}

/// Create the books module around `store`
pub fn create_module(store: BookStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
