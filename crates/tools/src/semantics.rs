//! MCP tool annotations derived from each route's HTTP verb.

use crate::catalog::ToolSpec;
use crate::client::HttpVerb;
use rmcp::model::ToolAnnotations;

/// Annotation hints for a catalog tool.
///
/// Every Jetty tool talks to a remote service, so `openWorldHint` is always `true`. PATCH on the
/// environment endpoint merges variables, so idempotence is left unset for it.
#[must_use]
pub fn annotations_for(tool: &ToolSpec) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match tool.route.verb {
        HttpVerb::Get => (true, false, Some(true)),
        HttpVerb::Post => (false, false, Some(false)),
        HttpVerb::Put | HttpVerb::Delete => (false, true, Some(true)),
        HttpVerb::Patch => (false, true, None),
    };

    ToolAnnotations {
        title: None,
        read_only_hint: Some(read_only),
        destructive_hint: Some(destructive),
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
