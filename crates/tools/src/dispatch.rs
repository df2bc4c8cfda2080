//! Tool registry + dispatcher.
//!
//! One generic loop over [`crate::catalog::CATALOG`]: look up the row, validate the arguments,
//! build the backend request from the row's [`Route`], call the gateway, wrap the payload.

use crate::catalog::{BodyRule, CATALOG, Route, RouteSummary, ToolSpec};
use crate::client::{BackendGateway, BackendRequest, RequestBody};
use crate::error::{JettyError, Result};
use crate::validate::CompiledSchema;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ToolRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    gateway: BackendGateway,
    tools: Vec<CompiledTool>,
}

struct CompiledTool {
    spec: &'static ToolSpec,
    input_schema: Arc<JsonObject>,
    schema: CompiledSchema,
}

impl ToolRegistry {
    /// Build the registry over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] if the catalog is malformed.
    pub fn new(gateway: BackendGateway) -> Result<Self> {
        Self::with_catalog(gateway, CATALOG)
    }

    /// Build the registry over an explicit catalog.
    ///
    /// # Errors
    ///
    /// Returns [`JettyError::Config`] on duplicate tool names, path placeholders that are not
    /// required parameters, or schemas that fail to compile.
    pub fn with_catalog(gateway: BackendGateway, catalog: &'static [ToolSpec]) -> Result<Self> {
        let mut names: HashSet<&str> = HashSet::new();
        let mut tools = Vec::with_capacity(catalog.len());

        for spec in catalog {
            if !names.insert(spec.name) {
                return Err(JettyError::Config(format!(
                    "Duplicate tool name '{}' in catalog",
                    spec.name
                )));
            }
            for ph in spec.route.placeholders() {
                if !spec.param(ph).is_some_and(|p| p.required) {
                    return Err(JettyError::Config(format!(
                        "Path placeholder '{{{ph}}}' of tool '{}' is not a required parameter",
                        spec.name
                    )));
                }
            }

            let schema_value = spec.input_schema();
            let schema = CompiledSchema::compile(spec, &schema_value)?;
            let input_schema = match schema_value {
                Value::Object(o) => o,
                _ => JsonObject::new(),
            };
            tools.push(CompiledTool {
                spec,
                input_schema: Arc::new(input_schema),
                schema,
            });
        }

        Ok(Self {
            inner: Arc::new(RegistryInner { gateway, tools }),
        })
    }

    /// The MCP tools advertised by this registry, in catalog order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner
            .tools
            .iter()
            .map(|t| {
                let mut tool = Tool::new(
                    t.spec.name,
                    t.spec.description,
                    t.input_schema.clone(),
                );
                tool.annotations = Some(crate::semantics::annotations_for(t.spec));
                tool
            })
            .collect()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<RouteSummary> {
        self.inner.tools.iter().map(|t| t.spec.summary()).collect()
    }

    /// Validate, dispatch, and return the raw backend payload.
    ///
    /// # Errors
    ///
    /// - [`JettyError::UnknownTool`] / [`JettyError::Validation`] before any network call
    /// - gateway errors (transport, backend status, decode) otherwise
    pub async fn invoke(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        let tool = self
            .inner
            .tools
            .iter()
            .find(|t| t.spec.name == tool_name)
            .ok_or_else(|| JettyError::UnknownTool(tool_name.to_string()))?;

        let args = arguments_object(tool.spec, arguments)?;
        tool.schema.validate(tool.spec, &args)?;

        let dock_url = self.inner.gateway.config().base_url(crate::config::Backend::Dock);
        let request = build_request(tool.spec, &args, dock_url)?;
        debug!(
            tool = %tool_name,
            backend = %tool.spec.route.backend,
            method = %request.verb,
            path = %request.path,
            "dispatching tool call"
        );

        self.inner
            .gateway
            .request(tool.spec.route.backend, request)
            .await
    }

    /// [`Self::invoke`] wrapped into the single-text-content MCP result.
    ///
    /// # Errors
    ///
    /// Same as [`Self::invoke`].
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<CallToolResult> {
        let payload = self.invoke(tool_name, arguments).await?;
        Ok(success_envelope(&payload))
    }
}

/// Pretty-printed JSON payload as the only content item.
#[must_use]
pub fn success_envelope(payload: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

fn arguments_object(spec: &ToolSpec, arguments: Value) -> Result<Map<String, Value>> {
    match arguments {
        Value::Object(m) => Ok(m),
        Value::Null => Ok(Map::new()),
        other => Err(JettyError::Validation {
            tool: spec.name.to_string(),
            message: "arguments must be a JSON object".to_string(),
            violations: json!({
                "type": "validation-errors",
                "violations": [{
                    "type": "constraint-violation",
                    "message": format!("expected object, got {}", json_type_name(&other)),
                    "instancePath": "",
                }],
            }),
        }),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Present argument, else the parameter's declared default.
fn resolve(spec: &ToolSpec, args: &Map<String, Value>, name: &str) -> Option<Value> {
    if let Some(v) = args.get(name) {
        return Some(v.clone());
    }
    spec.param(name)
        .and_then(|p| p.default)
        .map(|d| d.to_value())
}

pub(crate) fn build_request(
    spec: &ToolSpec,
    args: &Map<String, Value>,
    dock_url: &str,
) -> Result<BackendRequest> {
    let route: &Route = &spec.route;
    let path = render_path(spec, args)?;

    let mut request = BackendRequest::new(route.verb, path).long_running(route.long_running);

    for name in route.query {
        if let Some(v) = resolve(spec, args, name) {
            request = request.with_query(*name, scalar_to_string(&v));
        }
    }

    let body = match route.body {
        BodyRule::Empty => RequestBody::None,
        BodyRule::JsonFields(fields) => {
            let mut body = Map::new();
            for field in fields {
                // Presence check, not truthiness: "" is a value, absence is not.
                if let Some(v) = resolve(spec, args, field) {
                    body.insert((*field).to_string(), v);
                }
            }
            RequestBody::Json(Value::Object(body))
        }
        BodyRule::Wrapped { key, param } => {
            let inner = resolve(spec, args, param).unwrap_or_else(|| json!({}));
            let mut body = Map::new();
            body.insert(key.to_string(), inner);
            RequestBody::Json(Value::Object(body))
        }
        BodyRule::WorkflowRun { params } => {
            let init_params = match resolve(spec, args, params) {
                Some(v) if !v.is_null() => v.to_string(),
                _ => "{}".to_string(),
            };
            RequestBody::Multipart(vec![
                ("bakery_host".to_string(), dock_url.to_string()),
                ("init_params".to_string(), init_params),
            ])
        }
    };

    Ok(request.with_body(body))
}

fn render_path(spec: &ToolSpec, args: &Map<String, Value>) -> Result<String> {
    let mut path = spec.route.path.to_string();
    for name in spec.route.placeholders() {
        let Some(v) = args.get(name) else {
            return Err(JettyError::Validation {
                tool: spec.name.to_string(),
                message: format!("missing required parameter '{name}'"),
                violations: json!({
                    "type": "validation-errors",
                    "violations": [{ "type": "missing-required-parameter", "parameter": name }],
                }),
            });
        };
        let segment = encode_path_segment(&scalar_to_string(v));
        path = path.replace(&format!("{{{name}}}"), &segment);
    }
    Ok(path)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                match n.as_f64() {
                    // Exact decimal of the parsed value; `5.0` → `5`, `1e20` → all digits.
                    Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
                    _ => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}
