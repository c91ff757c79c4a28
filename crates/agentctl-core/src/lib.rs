// agentctl-core - Operation descriptors and the generic invocation adapter
//
// Every control-plane command runs through the same pipeline:
// bind inputs -> build request -> call -> project response -> emit.
// Operations differ only in their descriptor, generated at build time from
// model/bedrock-agentcore-control.json. No HTTP, no terminal I/O: the wire
// client and the prompt are supplied by the caller through traits.

pub mod binding;
pub mod cancel;
pub mod client;
pub mod confirm;
pub mod descriptor;
pub mod error;
pub mod invoke;
pub mod naming;
pub mod output;
pub mod pagination;
pub mod projection;
pub mod registry;

// Re-export commonly used types
pub use binding::{bind, BoundRequest, RawInputs, RawValue};
pub use cancel::{CancelHandle, CancelToken};
pub use client::{BoxError, ControlPlane, RemoteError};
pub use confirm::{ConfirmPolicy, ConfirmRequest, Confirmer, FixedAnswer};
pub use descriptor::{FieldDescriptor, FieldKind, Location, OperationDescriptor, Verb};
pub use error::{AdapterError, ErrorCode};
pub use invoke::{prepare, Adapter, InvokeOptions, Outcome, PreparedCall};
pub use output::OutputSink;
pub use projection::Selector;
pub use registry::SERVICE;
