//! rmcp `ServerHandler` over the Jetty tool registry.

use jetty_tools::{JettyError, ToolRegistry};
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use serde_json::Value;
use tracing::{debug, warn};

pub const SERVER_NAME: &str = "jetty";

#[derive(Clone)]
pub struct JettyServer {
    registry: ToolRegistry,
}

impl JettyServer {
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch one call and map the outcome onto the MCP surface.
    ///
    /// Invalid invocations (unknown tool, bad arguments) become protocol errors; failures of the
    /// backend exchange become tool results with `isError` set.
    pub async fn handle_call(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData> {
        self.registry
            .call_tool(name, arguments)
            .await
            .or_else(|e| error_result(name, e))
    }
}

fn error_result(tool: &str, e: JettyError) -> Result<CallToolResult, ErrorData> {
    if e.is_invalid_invocation() {
        debug!(tool = %tool, error = %e, "rejected tool call");
        return Err(ErrorData::invalid_params(e.to_string(), e.violations().cloned()));
    }
    warn!(tool = %tool, error = %e, "tool call failed");
    Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
}

impl ServerHandler for JettyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Tools for Jetty collections, tasks, workflow runs, trajectories, labels and step \
                 templates. Use run-workflow for fire-and-forget runs and get-workflow-logs to \
                 follow them."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        self.handle_call(&request.name, arguments).await
    }
}
