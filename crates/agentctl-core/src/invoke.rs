//! The generic adapter every command goes through.
//!
//! `prepare` binds inputs and resolves the selector without touching the
//! network, `Adapter::execute` confirms, calls, pages and emits.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::binding::{bind, BoundRequest, RawInputs};
use crate::cancel::CancelToken;
use crate::client::{ControlPlane, RemoteError};
use crate::confirm::{ConfirmPolicy, ConfirmRequest, Confirmer};
use crate::descriptor::OperationDescriptor;
use crate::error::AdapterError;
use crate::output::OutputSink;
use crate::pagination::{self, PagingMode};
use crate::projection::Selector;

/// Caller choices that are not operation parameters.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    /// Selector text; the operation default when `None`
    pub select: Option<String>,
    pub confirm: ConfirmPolicy,
    /// Follow pagination cursors
    pub auto_iterate: bool,
    /// Page size applied when the caller did not set one explicitly
    pub page_size: Option<u32>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            select: None,
            confirm: ConfirmPolicy::default(),
            auto_iterate: true,
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed {
        pages: usize,
        emitted: usize,
        /// Cursor for the next page when the caller drives paging
        next_cursor: Option<String>,
    },
    /// The confirmation was declined; nothing was sent
    Declined,
}

/// A validated call, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedCall {
    pub request: BoundRequest,
    pub selector: Selector,
    pub paging: PagingMode,
    pub confirm: ConfirmPolicy,
}

impl PreparedCall {
    pub fn operation(&self) -> &'static OperationDescriptor {
        self.request.operation()
    }
}

/// Bind inputs and resolve the selector. Nothing is sent.
pub fn prepare(
    op: &'static OperationDescriptor,
    raw: &RawInputs,
    options: &InvokeOptions,
) -> Result<PreparedCall, AdapterError> {
    let mut request = bind(op, raw)?;

    let selector = match options.select.as_deref() {
        Some(text) => Selector::parse(op, text)?,
        None => Selector::default_for(op)?,
    };

    if let (Some(size), Some(field)) = (
        options.page_size,
        op.pagination.and_then(|paging| paging.page_size),
    ) {
        request.set_if_absent(field, Value::from(size));
    }

    let paging = pagination::mode(op, raw, &selector, options.auto_iterate);

    Ok(PreparedCall {
        request,
        selector,
        paging,
        confirm: options.confirm,
    })
}

pub struct Adapter<C> {
    client: C,
    confirmer: Box<dyn Confirmer>,
}

impl<C: ControlPlane> Adapter<C> {
    pub fn new(client: C, confirmer: impl Confirmer + 'static) -> Self {
        Self {
            client,
            confirmer: Box::new(confirmer),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bind, confirm, call and emit in one step.
    pub async fn invoke(
        &self,
        op: &'static OperationDescriptor,
        raw: &RawInputs,
        options: &InvokeOptions,
        sink: &mut dyn OutputSink,
        cancel: &CancelToken,
    ) -> Result<Outcome, AdapterError> {
        let prepared = prepare(op, raw, options)?;
        self.execute(prepared, sink, cancel).await
    }

    #[instrument(skip_all, fields(operation = prepared.operation().name))]
    pub async fn execute(
        &self,
        prepared: PreparedCall,
        sink: &mut dyn OutputSink,
        cancel: &CancelToken,
    ) -> Result<Outcome, AdapterError> {
        let PreparedCall {
            mut request,
            selector,
            paging,
            confirm,
        } = prepared;
        let op = request.operation();

        if op.mutating && !confirm.force {
            let prompt = ConfirmRequest::for_request(&request);
            let approved = self
                .confirmer
                .confirm(&prompt)
                .map_err(|source| AdapterError::Confirmation {
                    operation: op.name,
                    source,
                })?;
            if !approved {
                warn!(resource = %prompt.target, "confirmation declined; nothing was sent");
                return Ok(Outcome::Declined);
            }
        }

        let mut pages = 0;
        let mut emitted = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(AdapterError::Cancelled { operation: op.name });
            }

            let response = self.call(op, &request, cancel).await?;
            pages += 1;

            for value in selector.project(&response, &request) {
                sink.emit(&value).map_err(|source| AdapterError::Output {
                    operation: op.name,
                    source,
                })?;
                emitted += 1;
            }

            let Some(paging_info) = op.pagination else {
                return Ok(Outcome::Completed {
                    pages,
                    emitted,
                    next_cursor: None,
                });
            };

            let cursor = pagination::next_cursor(&paging_info, &response);
            info!(page = pages, emitted, more = cursor.is_some(), "page received");

            let cursor = match (paging, cursor) {
                (_, None) => {
                    return Ok(Outcome::Completed {
                        pages,
                        emitted,
                        next_cursor: None,
                    })
                }
                (PagingMode::Single, Some(cursor)) => {
                    return Ok(Outcome::Completed {
                        pages,
                        emitted,
                        next_cursor: Some(cursor),
                    })
                }
                (PagingMode::Auto, Some(cursor)) => cursor,
            };

            if pagination::is_stalled(&paging_info, &request, &cursor) {
                return Err(AdapterError::PaginationStalled {
                    operation: op.name,
                    cursor,
                });
            }
            request.set(paging_info.input_token, Value::String(cursor));
        }
    }

    async fn call(
        &self,
        op: &'static OperationDescriptor,
        request: &BoundRequest,
        cancel: &CancelToken,
    ) -> Result<Value, AdapterError> {
        debug!(
            method = op.http.method,
            uri = op.http.uri,
            endpoint = self.client.endpoint(),
            "calling"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AdapterError::Cancelled { operation: op.name }),
            result = self.client.call(request) => {
                result.map_err(|err| self.remote_error(op, err))
            }
        }
    }

    fn remote_error(&self, op: &'static OperationDescriptor, err: RemoteError) -> AdapterError {
        let endpoint = self.client.endpoint().to_string();
        match err {
            RemoteError::Service {
                status,
                code,
                message,
                request_id,
            } => AdapterError::Service {
                operation: op.name,
                status,
                code,
                message,
                request_id,
            },
            RemoteError::NameResolution(source) => AdapterError::EndpointUnresolvable {
                operation: op.name,
                endpoint,
                source,
            },
            RemoteError::Transport(source) => AdapterError::Transport {
                operation: op.name,
                endpoint,
                source,
            },
            RemoteError::Decode(message) => AdapterError::Decode {
                operation: op.name,
                message,
            },
            RemoteError::Request(message) => AdapterError::Marshal {
                operation: op.name,
                message,
            },
        }
    }
}
