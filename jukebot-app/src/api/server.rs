//! HTTP server setup and routing
//!
//! A small Axum app exposing the clip trigger and the clip listing. It talks
//! straight to the voice session; triggered clips bypass any playlist
//! controller by design.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Error, Result};
use crate::state::Session;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<Session>,
    pub sounds_dir: PathBuf,
}

/// Build the trigger-surface router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/trigger/:clip", get(super::handlers::trigger_clip))
        .route("/sounds/", get(super::handlers::list_sounds))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP trigger server
pub async fn run(ctx: AppContext, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|_| Error::Config(format!("invalid HTTP bind address {host}:{port}")))?;

    info!("Starting HTTP trigger server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(ctx)).await?;
    Ok(())
}
