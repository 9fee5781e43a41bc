//! Blog server library logic.
//!
//! Exposes the router ([`app`]), the state injected into every handler
//! ([`AppState`]), and [`open_store`], which turns a database configuration
//! into a ready-to-serve pool or a fatal startup error.

pub mod api;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Extension, Json, Router,
};
use blog_db::{DbPool, PoolError, SchemaError};
use config::DatabaseConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Whether storage error messages are returned to clients.
    pub expose_errors: bool,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to open database: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to prepare database schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Opens the store described by `config` and guarantees its schema.
///
/// # Errors
///
/// Returns `StartupError` if the database cannot be opened or migrated. The
/// server must not serve requests in that case.
pub fn open_store(config: &DatabaseConfig) -> Result<DbPool, StartupError> {
    let pool = blog_db::create_pool(&config.path, config.runtime_settings())?;
    let applied = blog_db::ensure_schema(&pool)?;
    if applied > 0 {
        tracing::info!(count = applied, "applied database migrations");
    }
    tracing::info!(path = %config.path, "connected to the SQLite database");
    Ok(pool)
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/posts",
            get(api::list_posts_handler).post(api::create_post_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
