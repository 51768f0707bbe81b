//! Delegate seam between the orchestrator and its sub-flows.
//!
//! The orchestrator treats each operation as opaque and only consumes
//! the returned document, so tests can substitute canned delegates and
//! the production wiring stays in one place.

use std::path::Path;

use async_trait::async_trait;

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::auth::{self, AuthChoice};
use super::channels;
use super::finalize::{self, FinalizeOutcome};
use super::flow::WizardFlow;
use super::hooks;
use super::prompts::Prompter;
use super::remote;
use super::skills;

#[async_trait]
pub trait WizardDelegates: Send + Sync {
    async fn prompt_auth_choice(
        &self,
        prompter: &dyn Prompter,
        include_skip: bool,
    ) -> Result<AuthChoice, WizardError>;

    async fn apply_auth_choice(
        &self,
        choice: AuthChoice,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError>;

    async fn prompt_default_model(
        &self,
        prompter: &dyn Prompter,
        provider_id: Option<&str>,
    ) -> Result<Option<String>, WizardError>;

    async fn setup_channels(
        &self,
        config: ConfigDocument,
        flow: WizardFlow,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError>;

    async fn setup_skills(
        &self,
        config: ConfigDocument,
        workspace: &Path,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError>;

    async fn setup_internal_hooks(
        &self,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError>;

    async fn prompt_remote_gateway(
        &self,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError>;

    async fn finalize(
        &self,
        config: &ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<FinalizeOutcome, WizardError>;
}

/// Production delegates, backed by the real sub-flows.
pub struct GateDelegates;

impl GateDelegates {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GateDelegates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardDelegates for GateDelegates {
    async fn prompt_auth_choice(
        &self,
        prompter: &dyn Prompter,
        include_skip: bool,
    ) -> Result<AuthChoice, WizardError> {
        auth::prompt_auth_choice(prompter, include_skip)
    }

    async fn apply_auth_choice(
        &self,
        choice: AuthChoice,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError> {
        auth::apply_auth_choice(choice, config, prompter)
    }

    async fn prompt_default_model(
        &self,
        prompter: &dyn Prompter,
        provider_id: Option<&str>,
    ) -> Result<Option<String>, WizardError> {
        auth::prompt_default_model(prompter, provider_id)
    }

    async fn setup_channels(
        &self,
        config: ConfigDocument,
        flow: WizardFlow,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError> {
        channels::setup_channels(config, flow, prompter).await
    }

    async fn setup_skills(
        &self,
        config: ConfigDocument,
        workspace: &Path,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError> {
        skills::setup_skills(config, workspace, prompter)
    }

    async fn setup_internal_hooks(
        &self,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError> {
        hooks::setup_internal_hooks(config, prompter)
    }

    async fn prompt_remote_gateway(
        &self,
        config: ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<ConfigDocument, WizardError> {
        remote::prompt_remote_gateway(config, prompter)
    }

    async fn finalize(
        &self,
        config: &ConfigDocument,
        prompter: &dyn Prompter,
    ) -> Result<FinalizeOutcome, WizardError> {
        finalize::finalize(config, prompter)
    }
}
