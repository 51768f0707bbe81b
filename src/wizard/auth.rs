//! Authentication choice resolution.
//!
//! Picks the AI provider the agent will run against and applies it to
//! the document's provider section. The custom-API variant collects a
//! provider id, base URL, and key through its own sub-flow.

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::prompts::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChoice {
    OpenAi,
    Anthropic,
    OpenRouter,
    /// OpenAI-compatible endpoint with its own id/URL/key.
    CustomApiKey,
    /// Keep whatever is already configured.
    Skip,
}

impl AuthChoice {
    pub fn provider_id(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("openai"),
            Self::Anthropic => Some("anthropic"),
            Self::OpenRouter => Some("openrouter"),
            Self::CustomApiKey | Self::Skip => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::OpenRouter => "OpenRouter",
            Self::CustomApiKey => "Custom API (OpenAI-compatible)",
            Self::Skip => "Keep current provider",
        }
    }
}

/// Parse an explicit `--auth-choice` value.
pub fn parse_auth_choice(raw: &str) -> Result<AuthChoice, WizardError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(AuthChoice::OpenAi),
        "anthropic" => Ok(AuthChoice::Anthropic),
        "openrouter" => Ok(AuthChoice::OpenRouter),
        "custom" | "custom-api-key" => Ok(AuthChoice::CustomApiKey),
        "skip" => Ok(AuthChoice::Skip),
        other => Err(WizardError::Prompt(format!(
            "unrecognized auth choice '{other}' (expected openai, anthropic, openrouter, custom, or skip)"
        ))),
    }
}

/// Suggested default model per provider, used to pre-fill the model
/// prompt.
pub fn default_model_for(provider_id: &str) -> Option<&'static str> {
    match provider_id {
        "openai" => Some("gpt-4o-mini"),
        "anthropic" => Some("claude-3-5-sonnet-latest"),
        "openrouter" => Some("openrouter/auto"),
        _ => None,
    }
}

/// Collected by the custom-API sub-flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomApiConfig {
    pub provider_id: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Present the provider menu. `include_skip` adds a "keep current"
/// entry when the document already has a provider.
pub fn prompt_auth_choice(
    prompter: &dyn Prompter,
    include_skip: bool,
) -> Result<AuthChoice, WizardError> {
    let mut choices = vec![
        AuthChoice::OpenAi,
        AuthChoice::Anthropic,
        AuthChoice::OpenRouter,
        AuthChoice::CustomApiKey,
    ];
    if include_skip {
        choices.push(AuthChoice::Skip);
    }
    let labels: Vec<&str> = choices.iter().map(|c| c.label()).collect();
    let idx = prompter.select("AI provider", &labels, 0)?;
    Ok(choices[idx])
}

/// Collect the custom-API details.
pub fn prompt_custom_api_config(prompter: &dyn Prompter) -> Result<CustomApiConfig, WizardError> {
    let provider_id = prompter.text("Provider id", Some("custom"))?;
    let base_url = prompter.text("API base URL", Some("http://localhost:11434/v1"))?;
    let api_key = prompter.text("API key (leave empty if none)", Some(""))?;
    Ok(CustomApiConfig {
        provider_id,
        base_url,
        api_key: if api_key.trim().is_empty() {
            None
        } else {
            Some(api_key)
        },
    })
}

/// Write the chosen provider into the document. `Skip` and choices
/// without a standard provider id leave it untouched.
pub fn apply_auth_choice(
    choice: AuthChoice,
    config: ConfigDocument,
    prompter: &dyn Prompter,
) -> Result<ConfigDocument, WizardError> {
    match choice {
        AuthChoice::Skip => Ok(config),
        AuthChoice::CustomApiKey => {
            let custom = prompt_custom_api_config(prompter)?;
            Ok(config.with_provider(
                &custom.provider_id,
                Some(&custom.base_url),
                custom.api_key.as_deref(),
            ))
        }
        standard => {
            let id = standard
                .provider_id()
                .ok_or_else(|| WizardError::Prompt("provider id missing".to_string()))?;
            let key = prompter.text(&format!("{} API key", standard.label()), Some(""))?;
            let key = key.trim();
            Ok(config.with_provider(id, None, (!key.is_empty()).then_some(key)))
        }
    }
}

/// Prompt for a default model, pre-filled per provider. Empty answer
/// means "decide later".
pub fn prompt_default_model(
    prompter: &dyn Prompter,
    provider_id: Option<&str>,
) -> Result<Option<String>, WizardError> {
    let suggested = provider_id.and_then(default_model_for);
    let answer = prompter.text("Default model (leave empty to decide later)", suggested)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Non-fatal sanity check on the resulting provider section. Returns a
/// warning to surface as a note, or `None` when things look coherent.
pub fn warn_if_model_config_looks_off(config: &ConfigDocument) -> Option<String> {
    let provider = config.provider.as_ref()?;
    let id = provider.id.as_deref();
    let model = provider.default_model.as_deref();

    match (id, model) {
        (Some(id), None) => Some(format!(
            "provider '{id}' is configured without a default model; the agent will pick one at startup"
        )),
        (None, Some(model)) => Some(format!(
            "default model '{model}' is set but no provider is configured"
        )),
        (Some(id), Some(model)) => {
            let looks_foreign = (id == "anthropic" && model.starts_with("gpt-"))
                || (id == "openai" && model.starts_with("claude-"));
            looks_foreign.then(|| {
                format!("model '{model}' does not look like a '{id}' model; double-check the pairing")
            })
        }
        (None, None) => None,
    }
}
