//! `jetty-mcp`: MCP server exposing Jetty Dock and Flows operations as tools.
//!
//! Logs go to stderr; stdout belongs to the stdio transport.

mod config;
mod http;
mod server;

use anyhow::Context as _;
use clap::Parser as _;
use config::{Args, LogFormat, Transport};
use jetty_tools::{BackendGateway, ToolRegistry};
use rmcp::{ServiceExt as _, transport::stdio};
use server::JettyServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    let gateway_config = args.gateway_config().context("invalid configuration")?;
    info!(
        dock = gateway_config.base_url(jetty_tools::Backend::Dock),
        flows = gateway_config.base_url(jetty_tools::Backend::Flows),
        transport = ?args.transport,
        "starting jetty-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    let gateway = BackendGateway::new(gateway_config)?;
    let registry = ToolRegistry::new(gateway)?;
    info!(tools = registry.list_tools().len(), "tool catalog loaded");
    let server = JettyServer::new(registry);

    match args.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => http::serve(server, args.bind).await,
    }
}

async fn serve_stdio(server: JettyServer) -> anyhow::Result<()> {
    let service = server
        .serve(stdio())
        .await
        .context("start stdio transport")?;
    info!("serving MCP over stdio");

    tokio::select! {
        res = service.waiting() => {
            res.context("stdio transport")?;
        }
        () = http::shutdown_signal() => {}
    }
    info!("stdio transport closed");
    Ok(())
}

fn init_tracing(default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
