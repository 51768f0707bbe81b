//! Remote gateway setup.
//!
//! Collects the coordinates of a gateway running elsewhere. The URL
//! must parse as a probe-able endpoint before it is accepted; the token
//! is optional and an empty answer keeps whatever is already stored.

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::prompts::Prompter;

pub fn prompt_remote_gateway(
    config: ConfigDocument,
    prompter: &dyn Prompter,
) -> Result<ConfigDocument, WizardError> {
    let current_url = config.remote_url().map(str::to_string);

    let url = loop {
        let raw = prompter.text(
            "Remote gateway URL (ws:// or wss://)",
            current_url.as_deref(),
        )?;
        let raw = raw.trim().to_string();
        if raw.starts_with("ws://") || raw.starts_with("wss://") {
            break raw;
        }
        prompter.note(&format!("'{raw}' is not a ws:// or wss:// URL"));
    };

    let token = prompter.text("Gateway token (leave empty to keep current)", Some(""))?;
    let token = token.trim();

    Ok(config.with_remote(&url, (!token.is_empty()).then_some(token)))
}
