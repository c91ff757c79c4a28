// Confirmation prompts for mutating commands

use std::io::IsTerminal;

use agentctl_core::{BoxError, ConfirmRequest, Confirmer};
use dialoguer::Confirm;
use tracing::warn;

/// Asks on the terminal; the default answer is no.
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, request: &ConfirmRequest) -> Result<bool, BoxError> {
        let answer = Confirm::new()
            .with_prompt(request.prompt())
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Used when stdin is not a terminal: nobody can answer, so decline.
#[derive(Debug, Default)]
pub struct NonInteractiveConfirmer;

impl Confirmer for NonInteractiveConfirmer {
    fn confirm(&self, request: &ConfirmRequest) -> Result<bool, BoxError> {
        warn!(
            command = request.action,
            resource = %request.target,
            "confirmation required but stdin is not a terminal; pass --force to proceed"
        );
        Ok(false)
    }
}

/// Pick the confirmer for the current process.
pub fn confirmer() -> Box<dyn Confirmer> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalConfirmer)
    } else {
        Box::new(NonInteractiveConfirmer)
    }
}
