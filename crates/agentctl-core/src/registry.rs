//! Generated operation tables and lookups.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::descriptor::{
    FieldDescriptor, FieldKind, HttpBinding, Location, OperationDescriptor, Pagination,
    ServiceInfo, Verb,
};

include!(concat!(env!("OUT_DIR"), "/registry.rs"));

static BY_COMMAND: Lazy<HashMap<&'static str, &'static OperationDescriptor>> =
    Lazy::new(|| OPERATIONS.iter().map(|op| (op.command, op)).collect());

static BY_NAME: Lazy<HashMap<&'static str, &'static OperationDescriptor>> =
    Lazy::new(|| OPERATIONS.iter().map(|op| (op.name, op)).collect());

/// All operations, in model order.
pub fn operations() -> &'static [OperationDescriptor] {
    OPERATIONS
}

/// Look up an operation by CLI command, e.g. `remove-agent-runtime`.
pub fn find(command: &str) -> Option<&'static OperationDescriptor> {
    BY_COMMAND.get(command).copied()
}

/// Look up an operation by wire name, e.g. `DeleteAgentRuntime`.
pub fn by_operation(name: &str) -> Option<&'static OperationDescriptor> {
    BY_NAME.get(name).copied()
}
