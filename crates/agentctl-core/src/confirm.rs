//! Confirmation of mutating operations.

use serde_json::Value;

use crate::binding::BoundRequest;
use crate::client::BoxError;

/// Per-invocation override of the confirmation prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Skip the prompt entirely
    pub force: bool,
}

impl ConfirmPolicy {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// What the caller is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub operation: &'static str,
    /// Command name, e.g. `remove-agent-runtime`
    pub action: &'static str,
    /// Identifying input values, e.g. the runtime id
    pub target: String,
}

impl ConfirmRequest {
    pub fn for_request(request: &BoundRequest) -> Self {
        let op = request.operation();
        let parts: Vec<String> = op
            .confirm_fields
            .iter()
            .filter_map(|field| request.get(field))
            .map(render)
            .filter(|part| !part.is_empty())
            .collect();

        let target = if parts.is_empty() {
            op.noun.to_string()
        } else {
            parts.join("/")
        };

        Self {
            operation: op.name,
            action: op.command,
            target,
        }
    }

    /// Prompt text shown to interactive callers.
    pub fn prompt(&self) -> String {
        format!("Perform \"{}\" on target \"{}\"?", self.action, self.target)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Decides whether a mutating call may proceed.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, request: &ConfirmRequest) -> Result<bool, BoxError>;
}

impl<T: Confirmer + ?Sized> Confirmer for Box<T> {
    fn confirm(&self, request: &ConfirmRequest) -> Result<bool, BoxError> {
        (**self).confirm(request)
    }
}

/// Answers every request the same way without prompting.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirmer for FixedAnswer {
    fn confirm(&self, _request: &ConfirmRequest) -> Result<bool, BoxError> {
        Ok(self.0)
    }
}
