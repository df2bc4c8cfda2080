use jetty_test_support::{MockBackend, MockResponse};
use jetty_tools::{Backend, BackendGateway, CATALOG, GatewayConfig, JettyError, ToolRegistry};
use serde_json::{Value, json};

struct Harness {
    dock: MockBackend,
    flows: MockBackend,
    registry: ToolRegistry,
}

impl Harness {
    async fn start(payload: Value) -> Self {
        let dock = MockBackend::start(MockResponse::json(&payload))
            .await
            .expect("dock");
        let flows = MockBackend::start(MockResponse::json(&payload))
            .await
            .expect("flows");
        let cfg = GatewayConfig::new("test-token")
            .and_then(|c| c.with_dock_url(dock.base_url()))
            .and_then(|c| c.with_flows_url(flows.base_url()))
            .expect("config");
        let gateway = BackendGateway::new(cfg).expect("gateway");
        let registry = ToolRegistry::new(gateway).expect("registry");
        Self {
            dock,
            flows,
            registry,
        }
    }

    fn mock(&self, backend: Backend) -> &MockBackend {
        match backend {
            Backend::Dock => &self.dock,
            Backend::Flows => &self.flows,
        }
    }

    fn total_calls(&self) -> usize {
        self.dock.call_count() + self.flows.call_count()
    }
}

/// Minimal valid arguments: every required parameter filled in.
fn minimal_args(tool: &jetty_tools::ToolSpec) -> Value {
    let mut args = serde_json::Map::new();
    for p in tool.params.iter().filter(|p| p.required) {
        let v = match p.kind {
            jetty_tools::catalog::ParamKind::String => json!(format!("{}-v", p.name)),
            jetty_tools::catalog::ParamKind::Integer => json!(1),
            jetty_tools::catalog::ParamKind::Record => json!({"k": "v"}),
            jetty_tools::catalog::ParamKind::StringMap => json!({"K": "v"}),
        };
        args.insert(p.name.to_string(), v);
    }
    Value::Object(args)
}

fn text_of(result: &rmcp::model::CallToolResult) -> String {
    let v = serde_json::to_value(result).expect("serialize result");
    v["content"][0]["text"]
        .as_str()
        .expect("text content")
        .to_string()
}

#[tokio::test]
async fn every_tool_round_trips_the_backend_payload() {
    let payload = json!({"items": [{"id": 1}], "ok": true});
    let h = Harness::start(payload.clone()).await;

    for tool in CATALOG {
        let before = h.mock(tool.route.backend).call_count();
        let result = h
            .registry
            .call_tool(tool.name, minimal_args(tool))
            .await
            .unwrap_or_else(|e| panic!("{}: {e}", tool.name));

        assert_eq!(
            h.mock(tool.route.backend).call_count(),
            before + 1,
            "{} should hit {}",
            tool.name,
            tool.route.backend
        );
        let req = h.mock(tool.route.backend).last_request().expect("request");
        assert_eq!(req.method, tool.route.verb.as_str(), "{}", tool.name);
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));

        let text = text_of(&result);
        let parsed: Value = serde_json::from_str(&text).expect("payload is JSON text");
        assert_eq!(parsed, payload, "{}", tool.name);
        assert_eq!(text, serde_json::to_string_pretty(&payload).expect("pretty"));
    }

    assert_eq!(h.total_calls(), CATALOG.len());
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_network() {
    let h = Harness::start(json!({})).await;

    let err = h
        .registry
        .call_tool("get-task", json!({"collection": "c"}))
        .await
        .unwrap_err();
    assert!(err.is_invalid_invocation());
    assert!(err.to_string().contains("task"));

    let err = h
        .registry
        .call_tool("list-trajectories", json!({"collection": "c", "task": "t", "limit": "ten"}))
        .await
        .unwrap_err();
    assert!(matches!(err, JettyError::Validation { .. }));

    let err = h
        .registry
        .call_tool("no-such-tool", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, JettyError::UnknownTool(ref n) if n == "no-such-tool"));

    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn every_missing_required_argument_is_rejected_before_dispatch() {
    let h = Harness::start(json!({})).await;

    for tool in CATALOG {
        let full = minimal_args(tool);
        for p in tool.params.iter().filter(|p| p.required) {
            let mut args = full.clone();
            args.as_object_mut().expect("object").remove(p.name);

            let err = h
                .registry
                .call_tool(tool.name, args)
                .await
                .expect_err(&format!("{} without {}", tool.name, p.name));
            assert!(err.is_invalid_invocation(), "{}: {err}", tool.name);
            assert!(
                err.to_string().contains(p.name),
                "{}: message should name '{}': {err}",
                tool.name,
                p.name
            );
        }
    }

    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn update_task_sends_only_the_provided_field() {
    let h = Harness::start(json!({"updated": true})).await;

    h.registry
        .invoke(
            "update-task",
            json!({"collection": "c", "task": "t", "description": "new"}),
        )
        .await
        .expect("update");
    let req = h.dock.last_request().expect("request");
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path, "/api/v1/tasks/c/t");
    assert_eq!(req.body_json().expect("json"), json!({"description": "new"}));

    h.registry
        .invoke(
            "update-task",
            json!({"collection": "c", "task": "t", "description": ""}),
        )
        .await
        .expect("update");
    let req = h.dock.last_request().expect("request");
    assert_eq!(req.body_json().expect("json"), json!({"description": ""}));
}

#[tokio::test]
async fn trajectory_pagination_is_forwarded() {
    let h = Harness::start(json!([])).await;

    h.registry
        .invoke("list-trajectories", json!({"collection": "c", "task": "t"}))
        .await
        .expect("defaults");
    let req = h.flows.last_request().expect("request");
    assert_eq!(req.path, "/api/v1/db/trajectories/c/t");
    assert_eq!(req.query.as_deref(), Some("limit=10&page=1"));

    h.registry
        .invoke(
            "list-trajectories",
            json!({"collection": "c", "task": "t", "limit": 5, "page": 3}),
        )
        .await
        .expect("explicit");
    let req = h.flows.last_request().expect("request");
    assert_eq!(req.query.as_deref(), Some("limit=5&page=3"));
}

#[tokio::test]
async fn workflow_runs_post_multipart_fields_naming_the_dock_host() {
    let h = Harness::start(json!({"workflow_id": "wf-1"})).await;

    let v = h
        .registry
        .invoke(
            "run-workflow",
            json!({"collection": "c", "task": "t", "init_params": {"prompt": "hello"}}),
        )
        .await
        .expect("run");
    assert_eq!(v, json!({"workflow_id": "wf-1"}));

    let req = h.flows.last_request().expect("request");
    assert_eq!(req.path, "/api/v1/run/c/t");
    assert!(
        req.header("content-type")
            .is_some_and(|ct| ct.starts_with("multipart/form-data")),
        "{:?}",
        req.header("content-type")
    );
    let names: Vec<&str> = req.multipart.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["bakery_host", "init_params"]);
    assert_eq!(req.multipart_value("bakery_host"), Some(h.dock.base_url()));
    let init: Value =
        serde_json::from_str(req.multipart_value("init_params").expect("init_params"))
            .expect("json");
    assert_eq!(init, json!({"prompt": "hello"}));

    h.registry
        .invoke("run-workflow-sync", json!({"collection": "c", "task": "t"}))
        .await
        .expect("run sync");
    let req = h.flows.last_request().expect("request");
    assert_eq!(req.path, "/api/v1/run-sync/c/t");
    assert_eq!(req.multipart_value("init_params"), Some("{}"));
    assert_eq!(h.dock.call_count(), 0);
}

#[tokio::test]
async fn backend_failure_surfaces_status_and_body() {
    let h = Harness::start(json!({})).await;
    h.dock.set_response(MockResponse::text(404, "not found"));

    let err = h
        .registry
        .call_tool("get-collection", json!({"collection": "missing"}))
        .await
        .unwrap_err();
    assert!(!err.is_invalid_invocation());
    let msg = err.to_string();
    assert!(msg.contains("404"), "{msg}");
    assert!(msg.contains("not found"), "{msg}");
}

#[tokio::test]
async fn plain_text_payload_is_wrapped_as_a_json_string() {
    let h = Harness::start(json!({})).await;
    h.flows.set_response(MockResponse::text(200, "ok"));

    let result = h
        .registry
        .call_tool("get-workflow-logs", json!({"workflow_id": "wf-1"}))
        .await
        .expect("logs");
    assert_eq!(text_of(&result), "\"ok\"");
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    let h = Harness::start(json!({"unrouted": true})).await;
    h.dock
        .respond_to("/api/v1/collections/", MockResponse::json(&json!({"call": "collections"})));
    h.flows.respond_to(
        "/api/v1/db/stats/c1/t1",
        MockResponse::json(&json!({"call": "stats-1"})),
    );
    h.flows.respond_to(
        "/api/v1/db/stats/c2/t2",
        MockResponse::json(&json!({"call": "stats-2"})),
    );
    h.flows.respond_to(
        "/api/v1/db/trajectories/c3/t3",
        MockResponse::json(&json!({"call": "trajectories"})),
    );

    let (a, b, c, d) = tokio::join!(
        h.registry.invoke("list-collections", Value::Null),
        h.registry.invoke("get-stats", json!({"collection": "c1", "task": "t1"})),
        h.registry.invoke("get-stats", json!({"collection": "c2", "task": "t2"})),
        h.registry.invoke(
            "list-trajectories",
            json!({"collection": "c3", "task": "t3", "limit": 7, "page": 2})
        ),
    );
    assert_eq!(a.expect("a"), json!({"call": "collections"}));
    assert_eq!(b.expect("b"), json!({"call": "stats-1"}));
    assert_eq!(c.expect("c"), json!({"call": "stats-2"}));
    assert_eq!(d.expect("d"), json!({"call": "trajectories"}));

    assert_eq!(h.dock.call_count(), 1);
    let mut seen: Vec<(String, Option<String>)> = h
        .flows
        .requests()
        .into_iter()
        .map(|r| (r.path, r.query))
        .collect();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            ("/api/v1/db/stats/c1/t1".to_string(), None),
            ("/api/v1/db/stats/c2/t2".to_string(), None),
            (
                "/api/v1/db/trajectories/c3/t3".to_string(),
                Some("limit=7&page=2".to_string())
            ),
        ]
    );
}
