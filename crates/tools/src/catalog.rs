//! The fixed Jetty tool catalog.
//!
//! Every tool is one row: parameters (which determine the advertised JSON Schema) and a
//! [`Route`] describing how arguments turn into exactly one backend request. The dispatcher is a
//! generic loop over this table; adding a tool means appending a row.

use crate::client::HttpVerb;
use crate::config::Backend;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// Positive integer (pagination).
    Integer,
    /// Free-form JSON object.
    Record,
    /// Object whose values must all be strings.
    StringMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(u64),
}

impl DefaultValue {
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_string()),
            Self::Int(n) => Value::from(n),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Used when the argument is absent. Never applied to partial-update fields.
    pub default: Option<DefaultValue>,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    const fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
        }
    }

    const fn defaulted(
        name: &'static str,
        description: &'static str,
        kind: ParamKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: Some(default),
        }
    }

    /// JSON Schema for this parameter alone.
    #[must_use]
    pub fn schema(&self) -> Value {
        let mut schema = match self.kind {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Integer => json!({ "type": "integer", "minimum": 1 }),
            ParamKind::Record => json!({ "type": "object", "additionalProperties": true }),
            ParamKind::StringMap => json!({
                "type": "object",
                "additionalProperties": { "type": "string" }
            }),
        };
        schema["description"] = json!(self.description);
        if let Some(default) = self.default {
            schema["default"] = default.to_value();
        }
        schema
    }
}

/// How the request body is assembled from arguments.
#[derive(Debug, Clone, Copy)]
pub enum BodyRule {
    Empty,
    /// JSON object of the listed parameters. A field is sent iff its key is present in the
    /// arguments (or it has a declared default).
    JsonFields(&'static [&'static str]),
    /// JSON object `{ key: <argument param> }`.
    Wrapped {
        key: &'static str,
        param: &'static str,
    },
    /// Multipart fields `bakery_host` (dock base URL) then `init_params` (JSON of param or `{}`).
    WorkflowRun { params: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub backend: Backend,
    pub verb: HttpVerb,
    /// Path template; `{name}` placeholders are filled from required parameters.
    pub path: &'static str,
    /// Parameters sent as query pairs, in this order.
    pub query: &'static [&'static str],
    pub body: BodyRule,
    pub long_running: bool,
}

impl Route {
    const fn get(backend: Backend, path: &'static str) -> Self {
        Self {
            backend,
            verb: HttpVerb::Get,
            path,
            query: &[],
            body: BodyRule::Empty,
            long_running: false,
        }
    }

    const fn with_body(backend: Backend, verb: HttpVerb, path: &'static str, body: BodyRule) -> Self {
        Self {
            backend,
            verb,
            path,
            query: &[],
            body,
            long_running: false,
        }
    }

    /// Names of the `{placeholder}` segments in the path template.
    pub fn placeholders(&self) -> impl Iterator<Item = &'static str> {
        let path: &'static str = self.path;
        path.split('{')
            .skip(1)
            .filter_map(|rest| rest.split_once('}').map(|(name, _)| name))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub route: Route,
}

impl ToolSpec {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The advertised input schema (`type: object` with `properties` and `required`); keys
    /// outside `properties` are not accepted.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<&str> = Vec::new();
        for p in self.params {
            properties.insert(p.name.to_string(), p.schema());
            if p.required {
                required.push(p.name);
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    #[must_use]
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            name: self.name,
            backend: self.route.backend,
            method: self.route.verb.as_str(),
            path: self.route.path,
        }
    }
}

/// Serializable view of a catalog row (served at `/map`).
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: &'static str,
    pub backend: Backend,
    pub method: &'static str,
    pub path: &'static str,
}

const COLLECTION: ParamSpec =
    ParamSpec::required("collection", "Collection name", ParamKind::String);
const TASK: ParamSpec = ParamSpec::required("task", "Task name", ParamKind::String);
const TRAJECTORY_ID: ParamSpec =
    ParamSpec::required("trajectory_id", "Trajectory ID", ParamKind::String);
const INIT_PARAMS: ParamSpec = ParamSpec::optional(
    "init_params",
    "Input parameters for the workflow",
    ParamKind::Record,
);

pub static CATALOG: &[ToolSpec] = &[
    // Collections
    ToolSpec {
        name: "list-collections",
        description: "List all collections",
        params: &[],
        route: Route::get(Backend::Dock, "/api/v1/collections/"),
    },
    ToolSpec {
        name: "get-collection",
        description: "Get collection details including environment variable keys",
        params: &[COLLECTION],
        route: Route::get(Backend::Dock, "/api/v1/collections/{collection}"),
    },
    ToolSpec {
        name: "set-environment-variables",
        description: "Set environment variables on a collection (merged into existing variables)",
        params: &[
            COLLECTION,
            ParamSpec::required(
                "environment_variables",
                "Mapping of variable name to value",
                ParamKind::StringMap,
            ),
        ],
        route: Route::with_body(
            Backend::Dock,
            HttpVerb::Patch,
            "/api/v1/collections/{collection}/environment",
            BodyRule::Wrapped {
                key: "environment_variables",
                param: "environment_variables",
            },
        ),
    },
    // Tasks
    ToolSpec {
        name: "list-tasks",
        description: "List tasks in a collection",
        params: &[COLLECTION],
        route: Route::get(Backend::Dock, "/api/v1/tasks/{collection}/"),
    },
    ToolSpec {
        name: "get-task",
        description: "Get task details including workflow definition",
        params: &[COLLECTION, TASK],
        route: Route::get(Backend::Dock, "/api/v1/tasks/{collection}/{task}"),
    },
    ToolSpec {
        name: "create-task",
        description: "Create a new task with a workflow definition",
        params: &[
            COLLECTION,
            ParamSpec::required("name", "Task name", ParamKind::String),
            ParamSpec::defaulted(
                "description",
                "Task description",
                ParamKind::String,
                DefaultValue::Str(""),
            ),
            ParamSpec::required(
                "workflow",
                "Workflow JSON with init_params, step_configs, and steps",
                ParamKind::Record,
            ),
        ],
        route: Route::with_body(
            Backend::Dock,
            HttpVerb::Post,
            "/api/v1/tasks/{collection}",
            BodyRule::JsonFields(&["name", "description", "workflow"]),
        ),
    },
    ToolSpec {
        name: "update-task",
        description: "Update a task's workflow or description",
        params: &[
            COLLECTION,
            TASK,
            ParamSpec::optional("workflow", "Updated workflow JSON", ParamKind::Record),
            ParamSpec::optional("description", "Updated description", ParamKind::String),
        ],
        route: Route::with_body(
            Backend::Dock,
            HttpVerb::Put,
            "/api/v1/tasks/{collection}/{task}",
            BodyRule::JsonFields(&["workflow", "description"]),
        ),
    },
    ToolSpec {
        name: "delete-task",
        description: "Delete a task from a collection",
        params: &[COLLECTION, TASK],
        route: Route::with_body(
            Backend::Dock,
            HttpVerb::Delete,
            "/api/v1/tasks/{collection}/{task}",
            BodyRule::Empty,
        ),
    },
    // Run workflows
    ToolSpec {
        name: "run-workflow",
        description: "Run a workflow asynchronously (returns immediately with workflow_id)",
        params: &[COLLECTION, TASK, INIT_PARAMS],
        route: Route::with_body(
            Backend::Flows,
            HttpVerb::Post,
            "/api/v1/run/{collection}/{task}",
            BodyRule::WorkflowRun {
                params: "init_params",
            },
        ),
    },
    ToolSpec {
        name: "run-workflow-sync",
        description: "Run a workflow synchronously (blocks until completion, may take 30-60s)",
        params: &[COLLECTION, TASK, INIT_PARAMS],
        route: Route {
            long_running: true,
            ..Route::with_body(
                Backend::Flows,
                HttpVerb::Post,
                "/api/v1/run-sync/{collection}/{task}",
                BodyRule::WorkflowRun {
                    params: "init_params",
                },
            )
        },
    },
    ToolSpec {
        name: "get-workflow-logs",
        description: "Get execution logs for a workflow run",
        params: &[ParamSpec::required(
            "workflow_id",
            "Workflow ID returned by run-workflow",
            ParamKind::String,
        )],
        route: Route::get(Backend::Flows, "/api/v1/workflows-logs/{workflow_id}"),
    },
    // Trajectories
    ToolSpec {
        name: "list-trajectories",
        description: "List recent workflow runs (trajectories) for a task",
        params: &[
            COLLECTION,
            TASK,
            ParamSpec::defaulted("limit", "Max results", ParamKind::Integer, DefaultValue::Int(10)),
            ParamSpec::defaulted("page", "Page number", ParamKind::Integer, DefaultValue::Int(1)),
        ],
        route: Route {
            query: &["limit", "page"],
            ..Route::get(Backend::Flows, "/api/v1/db/trajectories/{collection}/{task}")
        },
    },
    ToolSpec {
        name: "get-trajectory",
        description: "Get full details of a specific workflow run",
        params: &[COLLECTION, TASK, TRAJECTORY_ID],
        route: Route::get(
            Backend::Flows,
            "/api/v1/db/trajectory/{collection}/{task}/{trajectory_id}",
        ),
    },
    // Stats
    ToolSpec {
        name: "get-stats",
        description: "Get execution statistics for a task",
        params: &[COLLECTION, TASK],
        route: Route::get(Backend::Flows, "/api/v1/db/stats/{collection}/{task}"),
    },
    // Labels
    ToolSpec {
        name: "add-label",
        description: "Add a label to a trajectory (e.g., quality=high)",
        params: &[
            COLLECTION,
            TASK,
            TRAJECTORY_ID,
            ParamSpec::required(
                "key",
                "Label key (e.g., 'quality', 'status')",
                ParamKind::String,
            ),
            ParamSpec::required(
                "value",
                "Label value (e.g., 'high', 'approved')",
                ParamKind::String,
            ),
            ParamSpec::required("author", "Author email", ParamKind::String),
        ],
        route: Route::with_body(
            Backend::Flows,
            HttpVerb::Post,
            "/api/v1/trajectory/{collection}/{task}/{trajectory_id}/labels",
            BodyRule::JsonFields(&["key", "value", "author"]),
        ),
    },
    // Step templates
    ToolSpec {
        name: "list-step-templates",
        description: "List all available workflow step templates",
        params: &[],
        route: Route::get(Backend::Flows, "/api/v1/step-templates"),
    },
    ToolSpec {
        name: "get-step-template",
        description: "Get details and schema for a step template",
        params: &[ParamSpec::required(
            "name",
            "Step template activity name",
            ParamKind::String,
        )],
        route: Route::get(Backend::Flows, "/api/v1/step-templates/{name}"),
    },
];

#[must_use]
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|t| t.name == name)
}
