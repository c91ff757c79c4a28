//! Error types for the invocation adapter

use thiserror::Error;

use crate::client::BoxError;

/// Stable codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// AC001: Required parameter not supplied
    AC001MissingParameter,
    /// AC002: Parameter value has the wrong type or is unknown
    AC002InvalidParameter,
    /// AC003: Selector does not resolve
    AC003InvalidSelector,
    /// AC004: Service returned an error response
    AC004Service,
    /// AC005: Endpoint host could not be resolved
    AC005EndpointUnresolvable,
    /// AC006: Connection or I/O failure
    AC006Transport,
    /// AC007: Service repeated a pagination cursor
    AC007PaginationStalled,
    /// AC008: Invocation cancelled
    AC008Cancelled,
    /// AC009: Confirmation prompt failed
    AC009Confirmation,
    /// AC010: Response was not valid JSON
    AC010Decode,
    /// AC011: Request could not be built
    AC011Marshal,
    /// AC012: Writing output failed
    AC012Output,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AC001MissingParameter => "AC001",
            Self::AC002InvalidParameter => "AC002",
            Self::AC003InvalidSelector => "AC003",
            Self::AC004Service => "AC004",
            Self::AC005EndpointUnresolvable => "AC005",
            Self::AC006Transport => "AC006",
            Self::AC007PaginationStalled => "AC007",
            Self::AC008Cancelled => "AC008",
            Self::AC009Confirmation => "AC009",
            Self::AC010Decode => "AC010",
            Self::AC011Marshal => "AC011",
            Self::AC012Output => "AC012",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`crate::invoke::Adapter`]
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{operation}: missing required parameter '{parameter}' (--{flag})")]
    MissingParameter {
        operation: &'static str,
        parameter: &'static str,
        flag: String,
    },

    #[error("{operation}: invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        operation: &'static str,
        parameter: String,
        reason: String,
    },

    #[error("{operation}: invalid selector '{selector}': {reason}")]
    InvalidSelector {
        operation: &'static str,
        selector: String,
        reason: String,
    },

    #[error("{operation} failed: {code}: {message} (HTTP {status})")]
    Service {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("{operation}: could not resolve endpoint {endpoint}; check the region and endpoint URL")]
    EndpointUnresolvable {
        operation: &'static str,
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation}: request to {endpoint} failed")]
    Transport {
        operation: &'static str,
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation}: service returned the same pagination cursor twice ({cursor})")]
    PaginationStalled {
        operation: &'static str,
        cursor: String,
    },

    #[error("{operation}: cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation}: confirmation failed")]
    Confirmation {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: {message}")]
    Marshal {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: writing output failed")]
    Output {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingParameter { .. } => ErrorCode::AC001MissingParameter,
            Self::InvalidParameter { .. } => ErrorCode::AC002InvalidParameter,
            Self::InvalidSelector { .. } => ErrorCode::AC003InvalidSelector,
            Self::Service { .. } => ErrorCode::AC004Service,
            Self::EndpointUnresolvable { .. } => ErrorCode::AC005EndpointUnresolvable,
            Self::Transport { .. } => ErrorCode::AC006Transport,
            Self::PaginationStalled { .. } => ErrorCode::AC007PaginationStalled,
            Self::Cancelled { .. } => ErrorCode::AC008Cancelled,
            Self::Confirmation { .. } => ErrorCode::AC009Confirmation,
            Self::Decode { .. } => ErrorCode::AC010Decode,
            Self::Marshal { .. } => ErrorCode::AC011Marshal,
            Self::Output { .. } => ErrorCode::AC012Output,
        }
    }

    /// Variant name, used as `kind` in error records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "MissingParameter",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::InvalidSelector { .. } => "InvalidSelector",
            Self::Service { .. } => "Service",
            Self::EndpointUnresolvable { .. } => "EndpointUnresolvable",
            Self::Transport { .. } => "Transport",
            Self::PaginationStalled { .. } => "PaginationStalled",
            Self::Cancelled { .. } => "Cancelled",
            Self::Confirmation { .. } => "Confirmation",
            Self::Decode { .. } => "Decode",
            Self::Marshal { .. } => "Marshal",
            Self::Output { .. } => "Output",
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::MissingParameter { operation, .. }
            | Self::InvalidParameter { operation, .. }
            | Self::InvalidSelector { operation, .. }
            | Self::Service { operation, .. }
            | Self::EndpointUnresolvable { operation, .. }
            | Self::Transport { operation, .. }
            | Self::PaginationStalled { operation, .. }
            | Self::Cancelled { operation }
            | Self::Confirmation { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Marshal { operation, .. }
            | Self::Output { operation, .. } => operation,
        }
    }

    /// True for failures detected before anything was sent.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. } | Self::InvalidParameter { .. } | Self::InvalidSelector { .. }
        )
    }

    pub(crate) fn invalid_parameter(
        operation: &'static str,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            operation,
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_selector(
        operation: &'static str,
        selector: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSelector {
            operation,
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}
