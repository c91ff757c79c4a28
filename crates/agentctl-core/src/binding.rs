//! Parameter binding: caller-supplied values to a validated request.
//!
//! Every value is checked against its [`FieldDescriptor`] before anything is
//! sent. Required fields are enforced here rather than by the argument
//! parser so the failure is the same for every caller.

use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::{FieldDescriptor, FieldKind, Location, OperationDescriptor};
use crate::error::AdapterError;

const FILE_PREFIX: &str = "file://";

/// A value as the caller supplied it, before type checking.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
    Json(Value),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Json(value)
    }
}

/// Caller-supplied parameters keyed by any accepted spelling of the name.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    values: Vec<(String, RawValue)>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a value; a later value for the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// True when a value was supplied under any spelling of `field`.
    pub fn contains(&self, field: &FieldDescriptor) -> bool {
        self.values.iter().any(|(name, _)| field.matches(name))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Validated request: field name to wire-ready JSON value.
#[derive(Debug, Clone)]
pub struct BoundRequest {
    operation: &'static OperationDescriptor,
    fields: Map<String, Value>,
}

impl BoundRequest {
    pub fn new(operation: &'static OperationDescriptor) -> Self {
        Self {
            operation,
            fields: Map::new(),
        }
    }

    pub fn operation(&self) -> &'static OperationDescriptor {
        self.operation
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Values bound to fields at `location`, in descriptor order.
    pub fn located(
        &self,
        location: Location,
    ) -> impl Iterator<Item = (&'static FieldDescriptor, &Value)> + '_ {
        self.operation
            .inputs
            .iter()
            .filter(move |field| field.location == location)
            .filter_map(move |field| self.fields.get(field.name).map(|value| (field, value)))
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub(crate) fn set_if_absent(&mut self, name: &str, value: Value) {
        self.fields.entry(name.to_string()).or_insert(value);
    }
}

/// Bind raw inputs to `op`, checking types, enums and required fields.
pub fn bind(
    op: &'static OperationDescriptor,
    raw: &RawInputs,
) -> Result<BoundRequest, AdapterError> {
    let mut request = BoundRequest::new(op);

    for (name, value) in raw.iter() {
        let field = op.input(name).ok_or_else(|| {
            AdapterError::invalid_parameter(op.name, name, "unknown parameter")
        })?;
        let bound = coerce(op, field, value)?;
        request.set(field.name, bound);
    }

    for field in op.required_inputs() {
        if request.get(field.name).is_none() {
            return Err(AdapterError::MissingParameter {
                operation: op.name,
                parameter: field.name,
                flag: field.flag(),
            });
        }
    }

    if let Some(token) = op.idempotency_token {
        if request.get(token).is_none() {
            let generated = uuid::Uuid::new_v4().to_string();
            debug!(operation = op.name, field = token, "generated idempotency token");
            request.set(token, Value::String(generated));
        }
    }

    Ok(request)
}

fn coerce(
    op: &'static OperationDescriptor,
    field: &'static FieldDescriptor,
    raw: &RawValue,
) -> Result<Value, AdapterError> {
    let invalid = |reason: String| AdapterError::invalid_parameter(op.name, field.name, reason);

    let value = match (field.kind, raw) {
        (FieldKind::String, RawValue::Text(text)) => Value::String(text.clone()),
        (FieldKind::String, RawValue::Json(Value::String(text))) => Value::String(text.clone()),

        (FieldKind::Integer, RawValue::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(format!("expected an integer, got '{text}'")))?,
        (FieldKind::Integer, RawValue::Json(Value::Number(n))) if n.is_i64() => {
            Value::Number(n.clone())
        }

        (FieldKind::Enum(allowed), RawValue::Text(text)) => allowed
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(text))
            .map(|canonical| Value::String(canonical.to_string()))
            .ok_or_else(|| {
                invalid(format!(
                    "'{text}' is not one of: {}",
                    allowed.join(", ")
                ))
            })?,

        (FieldKind::StringList, RawValue::List(items)) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        (FieldKind::StringList, RawValue::Text(text)) => {
            Value::Array(vec![Value::String(text.clone())])
        }
        (FieldKind::StringList, RawValue::Json(Value::Array(items)))
            if items.iter().all(Value::is_string) =>
        {
            Value::Array(items.clone())
        }

        (FieldKind::Document, RawValue::Text(text)) => parse_document(text).map_err(invalid)?,
        (FieldKind::Document, RawValue::Json(value)) => value.clone(),

        (kind, other) => {
            return Err(invalid(format!(
                "expected {}, got {}",
                kind.type_name(),
                describe(other)
            )))
        }
    };

    if field.location == Location::Uri {
        match value.as_str() {
            Some("") => return Err(invalid("must not be empty".to_string())),
            Some(dots @ ("." | "..")) => {
                return Err(invalid(format!("'{dots}' is not a valid path segment")))
            }
            _ => {}
        }
    }

    Ok(value)
}

fn describe(raw: &RawValue) -> &'static str {
    match raw {
        RawValue::Text(_) => "text",
        RawValue::List(_) => "a list",
        RawValue::Json(Value::Null) => "null",
        RawValue::Json(Value::Bool(_)) => "a boolean",
        RawValue::Json(Value::Number(_)) => "a number",
        RawValue::Json(Value::String(_)) => "a string",
        RawValue::Json(Value::Array(_)) => "an array",
        RawValue::Json(Value::Object(_)) => "an object",
    }
}

/// Inline JSON, or `file://path` naming a JSON file.
fn parse_document(text: &str) -> Result<Value, String> {
    match text.strip_prefix(FILE_PREFIX) {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {path}: {e}"))?;
            serde_json::from_str(&contents).map_err(|e| format!("{path} is not valid JSON: {e}"))
        }
        None => serde_json::from_str(text).map_err(|e| format!("not valid JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find;
    use std::io::Write as _;

    #[test]
    fn test_missing_required_parameter() {
        let op = find("remove-memory").unwrap();
        let err = bind(op, &RawInputs::new()).unwrap_err();
        match err {
            AdapterError::MissingParameter {
                parameter, flag, ..
            } => {
                assert_eq!(parameter, "memoryId");
                assert_eq!(flag, "memory-id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accepts_any_spelling_and_fills_idempotency_token() {
        let op = find("remove-agent-runtime").unwrap();
        let raw = RawInputs::new().with("agent-runtime-id", "rt-123");
        let request = bind(op, &raw).unwrap();

        assert_eq!(request.get("agentRuntimeId"), Some(&Value::from("rt-123")));
        let token = request.get("clientToken").and_then(Value::as_str).unwrap();
        assert!(uuid::Uuid::parse_str(token).is_ok());
    }

    #[test]
    fn test_caller_token_is_kept() {
        let op = find("remove-agent-runtime").unwrap();
        let raw = RawInputs::new()
            .with("agentRuntimeId", "rt-123")
            .with("clientToken", "mine");
        let request = bind(op, &raw).unwrap();
        assert_eq!(request.get("clientToken"), Some(&Value::from("mine")));
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let op = find("get-memory").unwrap();
        let raw = RawInputs::new().with("memoryId", "m-1").with("colour", "red");
        let err = bind(op, &raw).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidParameter { ref parameter, .. } if parameter == "colour"));
    }

    #[test]
    fn test_type_coercion() {
        let op = find("new-memory").unwrap();
        let raw = RawInputs::new()
            .with("name", "notes")
            .with("eventExpiryDuration", "30")
            .with("tags", r#"{"team":"agents"}"#);
        let request = bind(op, &raw).unwrap();
        assert_eq!(request.get("eventExpiryDuration"), Some(&Value::from(30)));
        assert_eq!(request.get("tags").unwrap()["team"], "agents");

        let bad = RawInputs::new()
            .with("name", "notes")
            .with("eventExpiryDuration", "thirty");
        assert!(matches!(
            bind(op, &bad).unwrap_err(),
            AdapterError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn test_enum_values_are_canonicalised() {
        let op = find("new-gateway").unwrap();
        let base = RawInputs::new()
            .with("name", "gw")
            .with("roleArn", "arn:aws:iam::123456789012:role/gw")
            .with("protocolType", "mcp");

        let request = bind(op, &base.clone().with("authorizerType", "aws_iam")).unwrap();
        assert_eq!(request.get("authorizerType"), Some(&Value::from("AWS_IAM")));
        assert_eq!(request.get("protocolType"), Some(&Value::from("MCP")));

        let err = bind(op, &base.with("authorizerType", "OIDC")).unwrap_err();
        assert!(err.to_string().contains("CUSTOM_JWT"));
    }

    #[test]
    fn test_string_list_and_empty_uri_label() {
        let op = find("sync-gateway-target").unwrap();
        let raw = RawInputs::new()
            .with("gatewayIdentifier", "gw-1")
            .with("targetIdList", RawValue::List(vec!["t1".into(), "t2".into()]));
        let request = bind(op, &raw).unwrap();
        assert_eq!(request.get("targetIdList"), Some(&serde_json::json!(["t1", "t2"])));

        let empty = RawInputs::new()
            .with("gatewayIdentifier", "")
            .with("targetIdList", "t1");
        assert!(bind(op, &empty).is_err());
    }

    #[test]
    fn test_dot_segments_in_uri_labels_are_rejected() {
        let cases = [
            ("remove-gateway", "gatewayIdentifier", ".."),
            ("get-memory", "memoryId", "."),
            ("remove-policy-engine", "policyEngineId", ".."),
        ];
        for (command, field, value) in cases {
            let op = find(command).unwrap();
            let err = bind(op, &RawInputs::new().with(field, value)).unwrap_err();
            assert_eq!(err.code().as_str(), "AC002", "{command}");
            assert!(err.to_string().contains("not a valid path segment"), "{err}");
        }

        let op = find("get-memory").unwrap();
        let request = bind(op, &RawInputs::new().with("memoryId", "m..1")).unwrap();
        assert_eq!(request.get("memoryId"), Some(&Value::from("m..1")));
    }

    #[test]
    fn test_list_is_not_a_string() {
        let op = find("get-memory").unwrap();
        let raw = RawInputs::new().with("memoryId", RawValue::List(vec!["m-1".into()]));
        let err = bind(op, &raw).unwrap_err();
        assert!(err.to_string().contains("expected string, got a list"));
    }

    #[test]
    fn test_document_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"cedar": {{"statement": "permit(principal, action, resource);"}}}}"#)
            .unwrap();

        let op = find("new-policy").unwrap();
        let raw = RawInputs::new()
            .with("policyEngineId", "pe-1")
            .with("name", "allow-all")
            .with(
                "definition",
                format!("file://{}", file.path().display()),
            );
        let request = bind(op, &raw).unwrap();
        assert!(request.get("definition").unwrap()["cedar"]["statement"]
            .as_str()
            .unwrap()
            .starts_with("permit"));

        let missing = RawInputs::new()
            .with("policyEngineId", "pe-1")
            .with("name", "allow-all")
            .with("definition", "file:///nonexistent/agentctl/policy.json");
        let err = bind(op, &missing).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_located_values_follow_descriptor_order() {
        let op = find("get-agent-runtime").unwrap();
        let raw = RawInputs::new()
            .with("agentRuntimeVersion", "3")
            .with("agentRuntimeId", "rt-1");
        let request = bind(op, &raw).unwrap();

        let uri: Vec<_> = request.located(Location::Uri).map(|(f, _)| f.name).collect();
        let query: Vec<_> = request.located(Location::Query).map(|(f, _)| f.wire_name).collect();
        assert_eq!(uri, ["agentRuntimeId"]);
        assert_eq!(query, ["version"]);
    }
}
