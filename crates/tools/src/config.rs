//! Gateway configuration: the credential, the two backend base URLs and timeout bounds.
//!
//! Built once at startup and passed explicitly to [`crate::client::BackendGateway::new`];
//! nothing here is read from the environment.

use crate::error::{JettyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DOCK_URL: &str = "https://dock.jetty.io";
pub const DEFAULT_FLOWS_URL: &str = "https://flows-api.jetty.io";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RUN_SYNC_TIMEOUT_SECS: u64 = 300;

/// Backend identity. Exactly two exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Collections, tasks and environment variables.
    Dock,
    /// Workflow runs, trajectories, stats, labels, step templates and logs.
    Flows,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dock => "dock",
            Self::Flows => "flows",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    token: String,
    dock_url: String,
    flows_url: String,
    request_timeout: Option<Duration>,
    run_sync_timeout: Option<Duration>,
}

impl GatewayConfig {
    /// Build a config with default endpoints and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(JettyError::Config(
                "JETTY_API_TOKEN is required (create one under Settings → API Tokens at https://flows.jetty.io)"
                    .to_string(),
            ));
        }

        Ok(Self {
            token,
            dock_url: DEFAULT_DOCK_URL.to_string(),
            flows_url: DEFAULT_FLOWS_URL.to_string(),
            request_timeout: timeout_from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            run_sync_timeout: timeout_from_secs(DEFAULT_RUN_SYNC_TIMEOUT_SECS),
        })
    }

    /// Override the Dock base URL.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] if the URL is not an absolute `http(s)` URL.
    pub fn with_dock_url(mut self, url: &str) -> Result<Self> {
        self.dock_url = parse_base_url(Backend::Dock, url)?;
        Ok(self)
    }

    /// Override the Flows base URL.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] if the URL is not an absolute `http(s)` URL.
    pub fn with_flows_url(mut self, url: &str) -> Result<Self> {
        self.flows_url = parse_base_url(Backend::Flows, url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_run_sync_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_sync_timeout = timeout;
        self
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn base_url(&self, backend: Backend) -> &str {
        match backend {
            Backend::Dock => &self.dock_url,
            Backend::Flows => &self.flows_url,
        }
    }

    /// Timeout for a request; `long_running` selects the synchronous-run bound.
    #[must_use]
    pub fn timeout_for(&self, long_running: bool) -> Option<Duration> {
        if long_running {
            self.run_sync_timeout
        } else {
            self.request_timeout
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("dock_url", &self.dock_url)
            .field("flows_url", &self.flows_url)
            .field("request_timeout", &self.request_timeout)
            .field("run_sync_timeout", &self.run_sync_timeout)
            .finish()
    }
}

/// `0` means "no bound".
#[must_use]
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_base_url(backend: Backend, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| {
        JettyError::Config(format!("Invalid {backend} base URL '{trimmed}': {e}"))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(JettyError::Config(format!(
            "Invalid {backend} base URL '{trimmed}': unsupported scheme '{}'",
            url.scheme()
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
