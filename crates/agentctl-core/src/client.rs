//! The seam between the adapter and whatever performs the remote call.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::binding::BoundRequest;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a wire client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with an error response
    #[error("{code}: {message} (HTTP {status})")]
    Service {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// The endpoint host name could not be resolved
    #[error("name resolution failed")]
    NameResolution(#[source] BoxError),

    /// Connection, TLS or I/O failure
    #[error("transport failure")]
    Transport(#[source] BoxError),

    /// Response body was not valid JSON
    #[error("undecodable response: {0}")]
    Decode(String),

    /// The request could not be built from the bound inputs
    #[error("cannot build request: {0}")]
    Request(String),
}

impl RemoteError {
    /// Classify a transport error, separating DNS failures from the rest.
    pub fn from_transport(err: BoxError) -> Self {
        if looks_like_name_resolution(err.as_ref()) {
            RemoteError::NameResolution(err)
        } else {
            RemoteError::Transport(err)
        }
    }
}

/// True when any error in the chain reports a failed host lookup.
pub fn looks_like_name_resolution(err: &(dyn std::error::Error + 'static)) -> bool {
    const MARKERS: &[&str] = &[
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname",
        "no such host",
    ];

    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        if MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = e.source();
    }
    false
}

/// Performs one remote call for a bound request.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Endpoint the client talks to, used in error messages.
    fn endpoint(&self) -> &str;

    async fn call(&self, request: &BoundRequest) -> Result<Value, RemoteError>;
}
