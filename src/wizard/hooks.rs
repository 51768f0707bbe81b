//! Internal automation hooks.

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::prompts::Prompter;

/// Configure built-in hooks. Currently just session memory capture:
/// when a conversation is reset, a summary is written to the session
/// store before the context is dropped.
pub fn setup_internal_hooks(
    config: ConfigDocument,
    prompter: &dyn Prompter,
) -> Result<ConfigDocument, WizardError> {
    let current = config
        .hooks
        .as_ref()
        .and_then(|h| h.session_memory)
        .unwrap_or(true);

    let session_memory = prompter.confirm(
        "Capture session memory when a conversation is reset?",
        current,
    )?;

    let mut config = config;
    config
        .hooks
        .get_or_insert_with(Default::default)
        .session_memory = Some(session_memory);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::prompts::{Answer, ScriptedPrompter};

    #[test]
    fn defaults_to_on_and_records_the_answer() {
        let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let config = setup_internal_hooks(ConfigDocument::default(), &prompter).unwrap();
        assert_eq!(config.hooks.unwrap().session_memory, Some(false));
    }

    #[test]
    fn existing_setting_is_the_prompt_default() {
        let mut base = ConfigDocument::default();
        base.hooks = Some(crate::config::HooksSection {
            session_memory: Some(false),
        });

        // NonInteractivePrompter-style scripted "take the default"
        let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let config = setup_internal_hooks(base, &prompter).unwrap();
        assert_eq!(config.hooks.unwrap().session_memory, Some(false));
    }
}
