//! Command-line / environment configuration for the `jetty-mcp` binary.

use clap::{Parser, ValueEnum};
use jetty_tools::GatewayConfig;
use jetty_tools::config::{
    DEFAULT_DOCK_URL, DEFAULT_FLOWS_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RUN_SYNC_TIMEOUT_SECS, timeout_from_secs,
};
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// Streamable HTTP on `/mcp`, plus `/health` and `/map`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "jetty-mcp", version, about = "MCP server for the Jetty Dock and Flows APIs")]
pub struct Args {
    /// Bearer token sent to both backends.
    #[arg(long, env = "JETTY_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    #[arg(long, env = "JETTY_DOCK_URL", default_value = DEFAULT_DOCK_URL)]
    pub dock_url: String,

    #[arg(long, env = "JETTY_FLOWS_URL", default_value = DEFAULT_FLOWS_URL)]
    pub flows_url: String,

    /// Per-request timeout in seconds (0 disables).
    #[arg(long, env = "JETTY_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Timeout for `run-workflow-sync` in seconds (0 disables).
    #[arg(
        long,
        env = "JETTY_RUN_SYNC_TIMEOUT_SECS",
        default_value_t = DEFAULT_RUN_SYNC_TIMEOUT_SECS
    )]
    pub run_sync_timeout_secs: u64,

    #[arg(long, env = "JETTY_MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "JETTY_MCP_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Default log filter; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "JETTY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "JETTY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Args {
    /// Build the gateway config.
    ///
    /// # Errors
    ///
    /// Fails if the token is missing or empty, or a base URL is not an absolute `http(s)` URL.
    pub fn gateway_config(&self) -> jetty_tools::Result<GatewayConfig> {
        let token = self.api_token.clone().unwrap_or_default();
        Ok(GatewayConfig::new(token)?
            .with_dock_url(&self.dock_url)?
            .with_flows_url(&self.flows_url)?
            .with_request_timeout(timeout_from_secs(self.timeout_secs))
            .with_run_sync_timeout(timeout_from_secs(self.run_sync_timeout_secs)))
    }
}
