use anyhow::Context as _;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use jetty_test_support::{KillOnDrop, MockBackend, MockResponse};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    jetty_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    jetty_test_support::wait_http_ok(url, timeout_dur).await
}

/// Spawn `jetty-mcp` on the HTTP transport with both backends pointed at `backend_url`.
pub fn spawn_server(backend_url: &str, port: u16) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_jetty-mcp");
    Command::new(bin)
        .env("JETTY_API_TOKEN", "integration-token")
        .env("JETTY_DOCK_URL", backend_url)
        .env("JETTY_FLOWS_URL", backend_url)
        .env_remove("RUST_LOG")
        .arg("--transport")
        .arg("http")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .stdin(Stdio::null())
        .spawn()
        .context("spawn jetty-mcp")
}

/// Start a mock backend and a server in front of it; returns `(backend, base_url, child)`.
#[allow(dead_code)]
pub async fn start_server_with_backend(
    response: MockResponse,
) -> anyhow::Result<(MockBackend, String, KillOnDrop)> {
    let backend = MockBackend::start(response).await?;
    let port = pick_unused_port()?;
    let child = KillOnDrop(spawn_server(backend.base_url(), port)?);

    let base_url = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20)).await?;
    Ok((backend, base_url, child))
}
