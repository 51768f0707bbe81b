//! Wizard error taxonomy.
//!
//! Cancellation is a control-flow signal, not a failure: it unwinds the
//! run without logging an error, and the CLI maps it to a quiet exit.

use thiserror::Error;

/// Errors raised by the setup wizard and its sub-flows.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The user declined a confirmation or aborted a prompt. Expected
    /// exit path; nothing beyond already-persisted steps is written.
    #[error("wizard cancelled")]
    Cancelled,

    /// An explicit `--flow` value was not one of quickstart/advanced/manual.
    /// Raised before any prompt is shown; no persistence.
    #[error("unrecognized flow value: {0:?} (expected quickstart, advanced, or manual)")]
    InvalidFlow(String),

    /// Prompt backend failure (terminal gone, scripted answers exhausted).
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Config persistence failure. Fatal: no silent partial writes.
    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

impl WizardError {
    /// Whether this is the user-cancellation signal rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
