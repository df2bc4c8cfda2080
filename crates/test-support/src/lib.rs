use anyhow::Context as _;
use axum::body::{Body, Bytes};
use axum::extract::{FromRequest as _, Multipart, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse as _, Response};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::Child;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Pick an unused TCP port on localhost.
///
/// Note: this does not reserve the port; it's still possible for another process to bind it
/// before you do.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or if the bound socket's
/// local address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll an HTTP URL until it returns a success status (2xx/3xx).
///
/// # Errors
///
/// Returns an error if the timeout elapses before the endpoint returns a success status.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > timeout_dur {
            anyhow::bail!("timed out waiting for {url}");
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// One request as seen by [`MockBackend`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Text fields of a `multipart/form-data` body, in wire order.
    pub multipart: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup (first value wins).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn body_json(&self) -> anyhow::Result<Value> {
        serde_json::from_slice(&self.body).context("parse recorded body as JSON")
    }

    #[must_use]
    pub fn multipart_value(&self, name: &str) -> Option<&str> {
        self.multipart
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Canned response served by [`MockBackend`] for every request.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockResponse {
    #[must_use]
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
            delay: None,
        }
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.into(),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct MockState {
    response: Mutex<MockResponse>,
    by_path: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process HTTP backend that records every request and answers with a canned response.
///
/// Stands in for Dock or Flows in tests; the server is stopped when the value is dropped.
pub struct MockBackend {
    base_url: String,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    /// Bind an ephemeral localhost port and start serving `response`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(response: MockResponse) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            response: Mutex::new(response),
            by_path: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let app = axum::Router::new()
            .fallback(record_and_respond)
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock backend")?;
        let addr = listener.local_addr().context("mock backend local_addr")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_response(&self, response: MockResponse) {
        *self.state.response.lock() = response;
    }

    /// Serve `response` for requests to exactly `path`, overriding the default response.
    pub fn respond_to(&self, path: impl Into<String>, response: MockResponse) {
        self.state.by_path.lock().insert(path.into(), response);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn record_and_respond(State(state): State<Arc<MockState>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let multipart = multipart_fields(&parts.headers, &body).await;
    let path = parts.uri.path().to_string();

    state.requests.lock().push(RecordedRequest {
        method: parts.method.as_str().to_string(),
        path: path.clone(),
        query: parts.uri.query().map(str::to_string),
        headers: parts
            .headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
        body: body.to_vec(),
        multipart,
    });

    let routed = state.by_path.lock().get(&path).cloned();
    let canned = routed.unwrap_or_else(|| state.response.lock().clone());
    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut resp = (status, canned.body).into_response();
    match canned
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        Some(ct) => {
            resp.headers_mut().insert(header::CONTENT_TYPE, ct);
        }
        None => {
            resp.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
    resp
}

/// Decode `multipart/form-data` text fields; empty for any other content type.
async fn multipart_fields(headers: &HeaderMap, body: &Bytes) -> Vec<(String, String)> {
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    if !is_multipart {
        return Vec::new();
    }

    let mut req = Request::new(Body::from(body.clone()));
    *req.headers_mut() = headers.clone();
    let Ok(mut multipart) = Multipart::from_request(req, &()).await else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.push((name, value));
    }
    fields
}
