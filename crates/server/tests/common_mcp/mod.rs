use anyhow::Context as _;
use futures::StreamExt as _;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::AsyncBufReadExt as _;
use tokio_util::io::StreamReader;

/// Test-only MCP client for the streamable HTTP endpoint (`/mcp`).
pub struct McpSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl McpSession {
    pub async fn connect(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let init_resp = post_mcp(
            &client,
            &base_url,
            None,
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "jetty-mcp-integration-tests", "version": "0" }
                }
            }),
        )
        .await?;

        let session_id = init_resp
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|h| h.to_str().ok())
            .context("missing Mcp-Session-Id header")?
            .to_string();

        let init_msg = read_first_event_stream_json_message(init_resp).await?;
        anyhow::ensure!(init_msg.get("id") == Some(&json!(0)), "unexpected init id");
        anyhow::ensure!(
            init_msg.pointer("/result/serverInfo/name") == Some(&json!("jetty")),
            "unexpected serverInfo: {init_msg}"
        );

        let initialized_resp = post_mcp(
            &client,
            &base_url,
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await?;
        anyhow::ensure!(
            initialized_resp.status().as_u16() == 202,
            "POST /mcp notifications/initialized returned {}",
            initialized_resp.status()
        );

        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    pub async fn request(
        &self,
        id: u64,
        method: &str,
        params: Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<Value> {
        let resp = post_mcp(
            &self.client,
            &self.base_url,
            Some(&self.session_id),
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }),
        )
        .await?;

        tokio::time::timeout(timeout_dur, read_first_event_stream_json_message(resp))
            .await
            .context("timeout waiting for event-stream response")?
    }

    pub async fn call_tool(&self, id: u64, name: &str, arguments: Value) -> anyhow::Result<Value> {
        self.request(
            id,
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
            Duration::from_secs(10),
        )
        .await
    }
}

/// `result.content[0].text` of a `tools/call` response.
#[allow(dead_code)]
pub fn tool_call_text(msg: &Value) -> anyhow::Result<String> {
    msg.pointer("/result/content/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("tools/call missing result.content[0].text: {msg}"))
}

/// The backend payload carried by a successful `tools/call` response.
#[allow(dead_code)]
pub fn tool_call_payload(msg: &Value) -> anyhow::Result<Value> {
    let text = tool_call_text(msg)?;
    serde_json::from_str(&text).context("tools/call text is not JSON")
}

#[allow(dead_code)]
pub fn tool_call_is_error(msg: &Value) -> bool {
    msg.pointer("/result/isError") == Some(&json!(true))
}

async fn post_mcp(
    client: &reqwest::Client,
    base_url: &str,
    session_id: Option<&str>,
    body: Value,
) -> anyhow::Result<reqwest::Response> {
    let mut req = client
        .post(format!("{base_url}/mcp"))
        .header("Accept", "application/json, text/event-stream")
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(session_id) = session_id {
        req = req.header("Mcp-Session-Id", session_id);
    }

    req.send()
        .await
        .context("POST /mcp")?
        .error_for_status()
        .context("POST /mcp status")
}

async fn read_first_event_stream_json_message(resp: reqwest::Response) -> anyhow::Result<Value> {
    let byte_stream = Box::pin(resp.bytes_stream().map(|r| r.map_err(std::io::Error::other)));
    let reader = StreamReader::new(byte_stream);
    let mut lines = tokio::io::BufReader::new(reader).lines();

    let mut data_lines: Vec<String> = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim_end();

        if line.is_empty() {
            if data_lines.is_empty() {
                continue;
            }
            return serde_json::from_str(&data_lines.join("\n"))
                .context("parse event-stream data as JSON");
        }

        if let Some(v) = line.strip_prefix("data:") {
            let v = v.trim();
            // Priming events carry an empty data field.
            if !v.is_empty() {
                data_lines.push(v.to_string());
            }
        }
    }

    anyhow::bail!("event-stream ended without a JSON message")
}
