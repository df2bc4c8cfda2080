//! Error types for `jetty-tools`.

use crate::config::Backend;
use serde_json::Value;
use thiserror::Error;

/// Main error type for gateway and dispatch operations.
#[derive(Error, Debug)]
pub enum JettyError {
    /// Configuration errors (missing token, invalid base URL, malformed catalog).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested tool is not part of the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments failed the tool's input schema. Never reaches the network.
    #[error("Invalid arguments for '{tool}': {message}")]
    Validation {
        tool: String,
        message: String,
        violations: Value,
    },

    /// DNS, connect, timeout or body-read failures.
    #[error("{backend} request {method} {path} failed: {message}")]
    Transport {
        backend: Backend,
        method: String,
        path: String,
        message: String,
    },

    /// Non-2xx response. `body` is the raw response text.
    #[error("Jetty API error {status} from {backend}: {body}")]
    Backend {
        backend: Backend,
        status: u16,
        body: String,
    },

    /// Response declared JSON but did not parse.
    #[error("Failed to decode {backend} response for {path}: {message}")]
    Decode {
        backend: Backend,
        path: String,
        message: String,
    },
}

impl JettyError {
    /// True for failures caused by the caller's invocation rather than the backend exchange.
    #[must_use]
    pub fn is_invalid_invocation(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::Validation { .. })
    }

    /// Structured details for invalid invocations (the violation list).
    #[must_use]
    pub fn violations(&self) -> Option<&Value> {
        match self {
            Self::Validation { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// Result type alias for `jetty-tools` operations.
pub type Result<T> = std::result::Result<T, JettyError>;
