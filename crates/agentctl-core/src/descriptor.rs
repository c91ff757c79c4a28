//! Declarative operation descriptors
//!
//! One `OperationDescriptor` describes everything the adapter needs to turn a
//! set of caller inputs into a remote call and a projected result. Instances
//! are generated at build time from the service model (see `build.rs`).

use crate::naming;

/// Service-level metadata from the model header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Service name as it appears in documentation
    pub name: &'static str,
    /// SigV4 signing name
    pub signing_name: &'static str,
    /// Host prefix used to build the regional endpoint
    pub endpoint_prefix: &'static str,
    pub api_version: &'static str,
}

impl ServiceInfo {
    /// Regional endpoint, e.g. `https://bedrock-agentcore-control.us-west-2.amazonaws.com`
    pub fn regional_endpoint(&self, region: &str) -> String {
        format!("https://{}.{}.amazonaws.com", self.endpoint_prefix, region)
    }
}

/// Command verb, following the verb-noun naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    New,
    Remove,
    Update,
    Sync,
    Start,
    Set,
    Add,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "Get",
            Verb::New => "New",
            Verb::Remove => "Remove",
            Verb::Update => "Update",
            Verb::Sync => "Sync",
            Verb::Start => "Start",
            Verb::Set => "Set",
            Verb::Add => "Add",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    /// Closed set of string values
    Enum(&'static [&'static str]),
    /// RFC 3339 or epoch seconds on input, epoch seconds on the wire
    StringList,
    /// Structure, map or list of structures, supplied as JSON
    Document,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Enum(_) => "enum",
            FieldKind::StringList => "string-list",
            FieldKind::Document => "document",
        }
    }
}

/// Where a field travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Uri,
    Query,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Member name (camelCase), also the key in the bound request
    pub name: &'static str,
    /// URI label, query key or header name; equals `name` for body fields
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub location: Location,
    pub required: bool,
    pub doc: &'static str,
}

impl FieldDescriptor {
    /// CLI flag name without the leading dashes
    pub fn flag(&self) -> String {
        naming::kebab_case(self.name)
    }

    /// True when `name` refers to this field in any accepted spelling.
    pub fn matches(&self, name: &str) -> bool {
        naming::normalize(name) == naming::normalize(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpBinding {
    pub method: &'static str,
    /// Path template with `{label}` placeholders
    pub uri: &'static str,
}

/// Cursor-based pagination metadata for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Input field carrying the cursor to the service
    pub input_token: &'static str,
    /// Response member holding the next cursor
    pub output_token: &'static str,
    /// Input field controlling page size
    pub page_size: Option<&'static str>,
    /// Response member holding the page's items
    pub items: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Wire operation name, e.g. `CreateAgentRuntime`
    pub name: &'static str,
    pub verb: Verb,
    pub noun: &'static str,
    /// Kebab-case command, e.g. `new-agent-runtime`
    pub command: &'static str,
    pub summary: &'static str,
    pub http: HttpBinding,
    pub inputs: &'static [FieldDescriptor],
    pub outputs: &'static [&'static str],
    pub default_select: &'static str,
    pub pagination: Option<Pagination>,
    pub mutating: bool,
    pub confirm_fields: &'static [&'static str],
    pub idempotency_token: Option<&'static str>,
}

impl OperationDescriptor {
    /// Find an input field by wire name, flag name or PascalCase name.
    pub fn input(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.inputs.iter().find(|field| field.matches(name))
    }

    /// Canonical spelling of a top-level response member, if it exists.
    pub fn output(&self, name: &str) -> Option<&'static str> {
        let wanted = naming::normalize(name);
        self.outputs
            .iter()
            .copied()
            .find(|member| naming::normalize(member) == wanted)
    }

    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    pub fn required_inputs(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.inputs.iter().filter(|field| field.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: &[FieldDescriptor] = &[
        FieldDescriptor {
            name: "agentRuntimeId",
            wire_name: "agentRuntimeId",
            kind: FieldKind::String,
            location: Location::Uri,
            required: true,
            doc: "",
        },
        FieldDescriptor {
            name: "agentRuntimeVersion",
            wire_name: "version",
            kind: FieldKind::String,
            location: Location::Query,
            required: false,
            doc: "",
        },
    ];

    static OP: OperationDescriptor = OperationDescriptor {
        name: "GetAgentRuntime",
        verb: Verb::Get,
        noun: "AgentRuntime",
        command: "get-agent-runtime",
        summary: "",
        http: HttpBinding {
            method: "GET",
            uri: "/runtimes/{agentRuntimeId}/",
        },
        inputs: INPUTS,
        outputs: &["agentRuntimeArn", "status"],
        default_select: "*",
        pagination: None,
        mutating: false,
        confirm_fields: &[],
        idempotency_token: None,
    };

    #[test]
    fn test_input_lookup_accepts_any_spelling() {
        assert_eq!(OP.input("agentRuntimeId").unwrap().name, "agentRuntimeId");
        assert_eq!(OP.input("agent-runtime-id").unwrap().name, "agentRuntimeId");
        assert_eq!(OP.input("AgentRuntimeId").unwrap().name, "agentRuntimeId");
        assert!(OP.input("version").is_none());
    }

    #[test]
    fn test_output_lookup_returns_canonical_name() {
        assert_eq!(OP.output("Status"), Some("status"));
        assert_eq!(OP.output("missing"), None);
    }

    #[test]
    fn test_flag_and_regional_endpoint() {
        assert_eq!(INPUTS[1].flag(), "agent-runtime-version");

        let service = ServiceInfo {
            name: "Amazon Bedrock AgentCore Control",
            signing_name: "bedrock-agentcore",
            endpoint_prefix: "bedrock-agentcore-control",
            api_version: "2023-06-05",
        };
        assert_eq!(
            service.regional_endpoint("us-west-2"),
            "https://bedrock-agentcore-control.us-west-2.amazonaws.com"
        );
    }
}
