//! HTTP server facade for shelf with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{extract::Request, routing::get, Router, ServiceExt};
use tower_http::normalize_path::NormalizePath;
use utoipa::OpenApi;

use shelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod extract;
pub mod router;

use router::RouterBuilder;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelf API",
        version = "1.0.0",
        description = "Keep track of the books you are reading"
    ),
    paths(health_check),
    components(schemas(error::ErrorResponse, error::ErrorBody))
)]
struct ApiDoc;

/// Start the HTTP server and serve until a shutdown signal arrives
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_service(registry, settings);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// The router as served: trailing slashes are trimmed before routing
pub type AppService = NormalizePath<Router>;

/// Build the served application; `/path/` reaches the same handler as `/path`
pub fn build_service(registry: &ModuleRegistry, settings: &Settings) -> AppService {
    NormalizePath::trim_trailing_slash(build_router(registry, settings))
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let mount_path = settings.server.mount_path(module.name());
        tracing::info!(module = module.name(), "mounting module routes under {}", mount_path);
        router_builder = router_builder.mount_module(&mount_path, module.routes());
    }

    // Layers wrap the routes registered above, so they go last.
    router_builder
        .with_openapi(openapi(registry, settings))
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Merge the service document with every module's document, prefixed by mount path
pub fn openapi(registry: &ModuleRegistry, settings: &Settings) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    for module in registry.modules() {
        if let Some(module_doc) = module.openapi() {
            let mount_path = settings.server.mount_path(module.name());
            doc = doc.nest_with_path_composer(mount_path, module_doc, |base, path| {
                if path == "/" {
                    base.to_string()
                } else {
                    format!("{base}{path}")
                }
            });
        }
    }

    doc
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
