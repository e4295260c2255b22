use analytics::QueryEngine;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use database::DbRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use timeseries::StoreHandle;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod tools;

pub use error::AppError;
pub use tools::{ParamSpec, ToolSpec, call_tool, tool_catalog};

/// The shared application state that all handlers can access.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: QueryEngine,
    pub store: StoreHandle,
    pub db_repo: DbRepository,
}

impl AppState {
    /// The engine reads through the same handle that reload swaps.
    pub fn new(store: StoreHandle, db_repo: DbRepository) -> Self {
        Self {
            engine: QueryEngine::new(store.clone()),
            store,
            db_repo,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/:name", post(handlers::invoke_tool))
        .route("/api/admin/reload", post(handlers::reload))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Serves the tool surface until Ctrl+C.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
