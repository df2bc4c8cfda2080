//! Argument validation against a tool's advertised input schema.

use crate::catalog::ToolSpec;
use crate::error::JettyError;
use serde_json::{Map, Value, json};

/// A tool's input schema compiled once at registry construction.
pub(crate) struct CompiledSchema {
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    pub(crate) fn compile(spec: &ToolSpec, schema: &Value) -> Result<Self, JettyError> {
        let validator = jsonschema::validator_for(schema).map_err(|e| {
            JettyError::Config(format!("invalid input schema for tool '{}': {e}", spec.name))
        })?;
        Ok(Self { validator })
    }

    /// Check `args` against the tool's parameters.
    ///
    /// Unknown keys, missing required keys and type/constraint violations are all collected
    /// before failing, so the caller sees every problem at once.
    pub(crate) fn validate(&self, spec: &ToolSpec, args: &Map<String, Value>) -> Result<(), JettyError> {
        let valid_params: Vec<&str> = spec.params.iter().map(|p| p.name).collect();
        let mut violations: Vec<Value> = Vec::new();

        for k in args.keys() {
            if spec.param(k).is_some() {
                continue;
            }
            violations.push(json!({
                "type": "invalid-parameter",
                "parameter": k,
                "suggestions": find_similar_strings(k, &valid_params),
                "validParameters": valid_params,
            }));
        }

        for p in spec.params.iter().filter(|p| p.required) {
            if !args.contains_key(p.name) {
                violations.push(json!({
                    "type": "missing-required-parameter",
                    "parameter": p.name,
                }));
            }
        }

        let instance = Value::Object(args.clone());
        for e in self.validator.iter_errors(&instance) {
            // Reported above with a nicer shape.
            if matches!(
                e.kind(),
                jsonschema::error::ValidationErrorKind::Required { .. }
                    | jsonschema::error::ValidationErrorKind::AdditionalProperties { .. }
            ) {
                continue;
            }
            violations.push(json!({
                "type": "constraint-violation",
                "message": e.to_string(),
                "instancePath": e.instance_path().to_string(),
            }));
        }

        if violations.is_empty() {
            return Ok(());
        }

        Err(JettyError::Validation {
            tool: spec.name.to_string(),
            message: summarize(&violations),
            violations: json!({
                "type": "validation-errors",
                "violations": violations,
            }),
        })
    }
}

fn summarize(violations: &[Value]) -> String {
    let first = &violations[0];
    let param = first.get("parameter").and_then(Value::as_str).unwrap_or("?");
    let head = match first.get("type").and_then(Value::as_str) {
        Some("invalid-parameter") => {
            let suggestion = first
                .get("suggestions")
                .and_then(Value::as_array)
                .and_then(|arr| arr.first())
                .and_then(Value::as_str);
            match suggestion {
                Some(s) => format!("unknown parameter '{param}' (did you mean '{s}'?)"),
                None => format!("unknown parameter '{param}'"),
            }
        }
        Some("missing-required-parameter") => format!("missing required parameter '{param}'"),
        _ => first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("constraint violation")
            .to_string(),
    };

    if violations.len() == 1 {
        head
    } else {
        format!("{head} (and {} more)", violations.len() - 1)
    }
}

fn find_similar_strings(unknown: &str, known: &[&str]) -> Vec<String> {
    let mut candidates: Vec<(f64, String)> = Vec::new();
    for k in known {
        let score = strsim::jaro(unknown, k);
        if score > 0.7 {
            candidates.push((score, (*k).to_string()));
        }
    }
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().map(|(_, s)| s).collect()
}
