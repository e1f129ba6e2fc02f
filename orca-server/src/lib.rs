//! # orca-server
//!
//! JSON-RPC 2.0 tool server exposing the agent over HTTP.
//!
//! Endpoints:
//! - `GET /` and `GET /health` answer with plain text
//! - `POST /` and `POST /tools/call` accept JSON-RPC requests
//!   (`ping`, `tools/list`, `tools/call`)

pub mod handlers;
pub mod protocol;

use axum::routing::get;
use axum::Router;
use orca_core::{ClientConfig, Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Shared, immutable server state
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ClientConfig>,
}

impl AppState {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::banner).post(handlers::jsonrpc))
        .route("/health", get(handlers::health))
        .route("/tools/call", axum::routing::post(handlers::jsonrpc))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        Error::from(e)
            .with_operation("server::serve")
            .with_context("addr", addr.to_string())
    })?;
    info!("Starting {} server on http://{}", handlers::SERVER_NAME, addr);
    info!("Available endpoints: /, /health, /tools/call");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| Error::from(e).with_operation("server::serve"))
}
