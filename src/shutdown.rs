// Signal handling
//
// Ctrl+C or SIGTERM trips the invocation's cancel handle.

use std::fmt;

use agentctl_core::CancelHandle;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    CtrlC,
    Terminate,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::CtrlC => f.write_str("SIGINT"),
            Interrupt::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Park forever when a handler could not be installed, so the other one
/// still decides.
async fn unavailable(interrupt: Interrupt, err: std::io::Error) -> Interrupt {
    error!(signal = %interrupt, "cannot listen for signal: {err}");
    std::future::pending().await
}

/// Resolves with the first interrupt received.
pub async fn next_interrupt() -> Interrupt {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => Interrupt::CtrlC,
            Err(e) => unavailable(Interrupt::CtrlC, e).await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                Interrupt::Terminate
            }
            Err(e) => unavailable(Interrupt::Terminate, e).await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Interrupt>();

    tokio::select! {
        interrupt = ctrl_c => interrupt,
        interrupt = terminate => interrupt,
    }
}

/// Spawn a task that cancels `handle` on the first interrupt.
/// Abort the returned task once the invocation is over.
pub fn watch_signals(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interrupt = next_interrupt().await;
        warn!(signal = %interrupt, "interrupted, abandoning the in-flight request");
        handle.cancel();
    })
}
