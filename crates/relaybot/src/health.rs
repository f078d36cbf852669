//! Liveness endpoint for the hosting platform.

use std::net::SocketAddr;

use axum::{routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(health_handler))
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Serve the health router until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "health endpoint listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
