//! Completion summary and dashboard handoff.

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::prompts::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// When true the orchestrator returns immediately; the dashboard
    /// owns the terminal from here.
    pub launched_dashboard: bool,
}

/// Show the completion summary and offer the dashboard.
pub fn finalize(
    config: &ConfigDocument,
    prompter: &dyn Prompter,
) -> Result<FinalizeOutcome, WizardError> {
    prompter.note(&config.summarize());

    let dashboard_url = format!("http://127.0.0.1:{}/", config.gateway_port());
    let launch = prompter.confirm("Open the gateway dashboard now?", false)?;
    if launch {
        prompter.outro(&format!("Dashboard: {dashboard_url}"));
    } else {
        prompter.outro(&format!(
            "Setup complete. Start the gateway and visit {dashboard_url} when ready."
        ));
    }

    Ok(FinalizeOutcome {
        launched_dashboard: launch,
    })
}
