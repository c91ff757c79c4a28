//! Response projection.
//!
//! A selector picks what gets emitted for each response:
//!
//! * `*` emits the whole response object
//! * `field` or `field.nested.path` emits one member; arrays are emitted
//!   element by element
//! * `^param` emits the bound value of an input parameter

use serde_json::Value;

use crate::binding::BoundRequest;
use crate::descriptor::OperationDescriptor;
use crate::error::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Whole,
    /// Path into the response; the first segment is a canonical output name
    Member(Vec<String>),
    /// Canonical input field name
    Param(&'static str),
}

impl Selector {
    /// Parse `text` and resolve it against the operation's inputs and outputs.
    pub fn parse(op: &'static OperationDescriptor, text: &str) -> Result<Self, AdapterError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdapterError::invalid_selector(op.name, text, "selector is empty"));
        }
        if text == "*" {
            return Ok(Selector::Whole);
        }

        if let Some(param) = text.strip_prefix('^') {
            return op
                .input(param)
                .map(|field| Selector::Param(field.name))
                .ok_or_else(|| {
                    AdapterError::invalid_selector(
                        op.name,
                        text,
                        format!("'{param}' is not a parameter of {}", op.command),
                    )
                });
        }

        let mut segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(AdapterError::invalid_selector(op.name, text, "empty path segment"));
        }
        let head = op.output(&segments[0]).ok_or_else(|| {
            let reason = if op.outputs.is_empty() {
                "the response has no members; use '*' or '^param'".to_string()
            } else {
                format!("expected one of: *, {}", op.outputs.join(", "))
            };
            AdapterError::invalid_selector(op.name, text, reason)
        })?;
        segments[0] = head.to_string();
        Ok(Selector::Member(segments))
    }

    /// Resolve the operation's default selector.
    pub fn default_for(op: &'static OperationDescriptor) -> Result<Self, AdapterError> {
        Self::parse(op, op.default_select)
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, Selector::Whole)
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Selector::Param(_))
    }

    /// Values to emit for one response. `null` and empty objects yield nothing.
    pub fn project(&self, response: &Value, request: &BoundRequest) -> Vec<Value> {
        let selected = match self {
            Selector::Whole => Some(response),
            Selector::Param(name) => request.get(name),
            Selector::Member(path) => walk(response, path),
        };

        let Some(selected) = selected else {
            return Vec::new();
        };

        match (self, selected) {
            (Selector::Member(_), Value::Array(items)) => items
                .iter()
                .filter(|item| !is_empty(item))
                .cloned()
                .collect(),
            (_, value) if is_empty(value) => Vec::new(),
            (_, value) => vec![value.clone()],
        }
    }
}

fn walk<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Whole => f.write_str("*"),
            Selector::Member(path) => f.write_str(&path.join(".")),
            Selector::Param(name) => write!(f, "^{name}"),
        }
    }
}
