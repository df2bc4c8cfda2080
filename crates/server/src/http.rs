//! Streamable HTTP transport: `/mcp` plus the `/health` and `/map` endpoints.

use crate::server::JettyServer;
use anyhow::Context as _;
use axum::{Json, Router, extract::State, routing::get};
use jetty_tools::catalog::RouteSummary;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Serialize)]
struct MapResponse {
    tools: Vec<RouteSummary>,
}

pub fn router(server: JettyServer) -> Router {
    let mcp_server = server.clone();
    let mcp = StreamableHttpService::new(
        move || Ok(mcp_server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .route("/map", get(map))
        .with_state(server)
        .nest_service("/mcp", mcp)
}

async fn health() -> &'static str {
    "ok"
}

async fn map(State(server): State<JettyServer>) -> Json<MapResponse> {
    Json(MapResponse {
        tools: server.registry().routes(),
    })
}

/// Serve until Ctrl-C / SIGTERM.
///
/// # Errors
///
/// Fails if the listener cannot be bound or the server loop errors.
pub async fn serve(server: JettyServer, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    let local = listener.local_addr().context("local_addr")?;
    info!(addr = %local, "listening (streamable HTTP on /mcp)");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("http server")?;

    info!("http server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
