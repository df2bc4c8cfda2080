//! Backend gateway: one authenticated HTTP exchange against Dock or Flows.
//!
//! The gateway is immutable after construction and safe to share across tasks; the only shared
//! resource is `reqwest`'s own connection pool.

use crate::config::{Backend, GatewayConfig};
use crate::error::{JettyError, Result};
use mime::Mime;
use reqwest::{Client, Method};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Verb set exposed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    #[must_use]
    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(Value),
    /// `multipart/form-data` text fields, sent in order.
    Multipart(Vec<(String, String)>),
}

/// A single outbound request, built per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub verb: HttpVerb,
    /// Path relative to the backend base URL, already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Selects the long-running timeout bound.
    pub long_running: bool,
}

impl BackendRequest {
    #[must_use]
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::None,
            long_running: false,
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn long_running(mut self, long_running: bool) -> Self {
        self.long_running = long_running;
        self
    }
}

#[derive(Clone)]
pub struct BackendGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: GatewayConfig,
    client: Client,
}

impl BackendGateway {
    /// Build a gateway from an explicit config.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jetty-tools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JettyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(GatewayInner { config, client }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub async fn dock(&self, request: BackendRequest) -> Result<Value> {
        self.request(Backend::Dock, request).await
    }

    pub async fn flows(&self, request: BackendRequest) -> Result<Value> {
        self.request(Backend::Flows, request).await
    }

    pub async fn get(&self, backend: Backend, path: &str) -> Result<Value> {
        self.request(backend, BackendRequest::new(HttpVerb::Get, path))
            .await
    }

    pub async fn post(&self, backend: Backend, path: &str, body: RequestBody) -> Result<Value> {
        self.request(backend, BackendRequest::new(HttpVerb::Post, path).with_body(body))
            .await
    }

    pub async fn put(&self, backend: Backend, path: &str, body: RequestBody) -> Result<Value> {
        self.request(backend, BackendRequest::new(HttpVerb::Put, path).with_body(body))
            .await
    }

    pub async fn patch(&self, backend: Backend, path: &str, body: RequestBody) -> Result<Value> {
        self.request(backend, BackendRequest::new(HttpVerb::Patch, path).with_body(body))
            .await
    }

    pub async fn delete(&self, backend: Backend, path: &str) -> Result<Value> {
        self.request(backend, BackendRequest::new(HttpVerb::Delete, path))
            .await
    }

    /// Perform one exchange against `backend`.
    ///
    /// Returns parsed JSON for JSON responses and the raw text (as a JSON string) otherwise.
    ///
    /// # Errors
    ///
    /// - [`JettyError::Transport`] for DNS/connect/timeout/body-read failures
    /// - [`JettyError::Backend`] for non-2xx statuses (status + raw body)
    /// - [`JettyError::Decode`] for unparseable JSON responses
    pub async fn request(&self, backend: Backend, request: BackendRequest) -> Result<Value> {
        let cfg = &self.inner.config;
        let url = build_url(cfg.base_url(backend), &request.path, &request.query)
            .map_err(|message| transport_error(backend, &request, message))?;

        let mut builder = self.inner.client.request(request.verb.as_method(), url);
        for (name, value) in &request.headers {
            // The configured credential always wins.
            if name.eq_ignore_ascii_case(reqwest::header::AUTHORIZATION.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }
        builder = builder.bearer_auth(cfg.token());
        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(v) => builder.json(v),
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)),
        };
        if let Some(t) = cfg.timeout_for(request.long_running) {
            builder = builder.timeout(t);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(backend, &request, sanitize_reqwest_error(&e)))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(backend, &request, sanitize_reqwest_error(&e)))?;

        debug!(
            backend = %backend,
            method = %request.verb,
            path = %request.path,
            status = status.as_u16(),
            "backend responded"
        );

        if !status.is_success() {
            return Err(JettyError::Backend {
                backend,
                status: status.as_u16(),
                body: text,
            });
        }

        if is_json_content_type(content_type.as_deref()) {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| JettyError::Decode {
                backend,
                path: request.path.clone(),
                message: e.to_string(),
            });
        }

        Ok(Value::String(text))
    }
}

fn transport_error(backend: Backend, request: &BackendRequest, message: String) -> JettyError {
    JettyError::Transport {
        backend,
        method: request.verb.to_string(),
        path: request.path.clone(),
        message,
    }
}

fn multipart_form(fields: &[(String, String)]) -> reqwest::multipart::Form {
    fields
        .iter()
        .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        })
}

fn build_url(
    base_url: &str,
    path: &str,
    query: &[(String, String)],
) -> std::result::Result<Url, String> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    let mut url = Url::parse(&raw).map_err(|e| format!("invalid URL: {e}"))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let Ok(m) = ct.parse::<Mime>() else {
        return false;
    };
    m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
}

fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    if e.is_timeout() && !msg.contains("timed out") {
        msg.push_str(" (timed out)");
    }
    msg
}
