//! Setup wizard orchestration.
//!
//! A multi-step, branching flow that reconciles the persisted
//! configuration with new user choices. The orchestrator owns the
//! evolving document; every sub-flow consumes it by value and returns a
//! new one, so keep/modify/reset semantics stay auditable. Runs are
//! resumable: persisted writes are never rolled back on cancellation,
//! and a rerun over a completed setup converges to the same document.

pub mod auth;
pub mod channels;
pub mod delegates;
pub mod finalize;
pub mod flow;
pub mod gateway;
pub mod hooks;
pub mod probe;
pub mod prompts;
pub mod remote;
pub mod reset;
pub mod skills;


use std::fs;
use std::path::PathBuf;

use crate::config::{
    self, ConfigDocument, DEFAULT_WORKSPACE, GatePaths, resolve_user_path,
};
use crate::error::WizardError;
use crate::locale::{self, DEFAULT_LOCALE};

use auth::AuthChoice;
use delegates::WizardDelegates;
use flow::{Mode, WizardFlow, WizardStep};
use gateway::{GatewayConfigArgs, QuickstartGatewayDefaults, configure_gateway};
use probe::{ProbeCredentials, ProbeOutcome, probe_gateway};
use prompts::Prompter;
use reset::ResetScope;

/// Explicit answers supplied on the command line; `None` means ask.
#[derive(Debug, Clone, Default)]
pub struct OnboardOptions {
    pub flow: Option<String>,
    pub mode: Option<Mode>,
    pub workspace: Option<String>,
    pub auth_choice: Option<String>,
    pub accept_risk: bool,
    pub skip_channels: bool,
    pub skip_skills: bool,
    pub locale: Option<String>,
}

impl OnboardOptions {
    pub fn from_args(args: &crate::cli::OnboardArgs) -> Self {
        Self {
            flow: args.flow.clone(),
            mode: args.mode.map(|m| match m {
                crate::cli::ModeArg::Local => Mode::Local,
                crate::cli::ModeArg::Remote => Mode::Remote,
            }),
            workspace: args.workspace.clone(),
            auth_choice: args.auth_choice.clone(),
            accept_risk: args.accept_risk,
            skip_channels: args.skip_channels,
            skip_skills: args.skip_skills,
            locale: args.locale.clone(),
        }
    }
}

/// How a wizard run ended. The CLI maps `InvalidConfig` to a non-zero
/// exit; the other outcomes are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Completed,
    RemoteConfigured,
    /// The persisted configuration is structurally broken; nothing was
    /// written or destroyed.
    InvalidConfig,
}

fn at(step: WizardStep) {
    tracing::debug!(?step, "wizard step");
}

/// Run the setup wizard end to end.
pub async fn run_wizard(
    opts: &OnboardOptions,
    prompter: &dyn Prompter,
    delegates: &dyn WizardDelegates,
    paths: &GatePaths,
) -> Result<WizardOutcome, WizardError> {
    at(WizardStep::Start);

    // an unrecognized explicit flow is rejected before anything is shown
    if let Some(raw) = &opts.flow {
        flow::parse_flow(raw)?;
    }

    prompter.intro("crabgate setup");

    // 1: load and validate the persisted state
    let snapshot = config::load_snapshot(paths);
    if snapshot.exists && !snapshot.valid {
        prompter.note(&format!(
            "The configuration at {} has problems:",
            paths.config_path().display()
        ));
        for issue in &snapshot.issues {
            if issue.path.is_empty() {
                prompter.note(&format!("- {}", issue.message));
            } else {
                prompter.note(&format!("- {}: {}", issue.path, issue.message));
            }
        }
        prompter.note("Fix the file (see `crabgate doctor`) and run setup again.");
        return Ok(WizardOutcome::InvalidConfig);
    }

    // 2: locale, applied before any further text
    at(WizardStep::Locale);
    let locale_tag = opts
        .locale
        .clone()
        .or_else(|| snapshot.config.language.clone())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
    locale::set_locale(&locale_tag);
    let mut working = snapshot.config.clone().with_language(&locale_tag);

    // 3: risk acknowledgement
    at(WizardStep::RiskAck);
    if !opts.accept_risk {
        let accepted = prompter.confirm(
            "crabgate will relay messages to an agent that can read files and run actions on this machine. Continue?",
            true,
        )?;
        if !accepted {
            return Err(WizardError::Cancelled);
        }
    }

    // 4: flow, explicit value validated before any prompt
    at(WizardStep::FlowSelect);
    let requested_flow = match &opts.flow {
        Some(raw) => flow::parse_flow(raw)?,
        None => {
            let idx = prompter.select(
                "Setup flow",
                &["quickstart (defaults, fewest questions)", "advanced (every option)"],
                0,
            )?;
            if idx == 1 {
                WizardFlow::Advanced
            } else {
                WizardFlow::Quickstart
            }
        }
    };

    // 5: remote setup has no quickstart path
    let (mut run_flow, forced) = flow::effective_flow(requested_flow, opts.mode);
    if forced {
        prompter.note("Remote gateway setup needs the advanced flow; switching over.");
    }

    // 6: reconcile with the existing document
    if snapshot.exists {
        at(WizardStep::ExistingConfig);
        prompter.note("Found an existing configuration:");
        prompter.note(&working.summarize());
        let action = prompter.select(
            "What would you like to do with it?",
            &["keep it as the baseline", "modify it", "reset and start over"],
            0,
        )?;
        match action {
            1 => {
                // walk every option with the current values pre-filled
                run_flow = WizardFlow::Advanced;
            }
            2 => {
                let scope_labels: Vec<&str> =
                    ResetScope::ALL.iter().map(|s| s.label()).collect();
                let idx = prompter.select("Reset scope", &scope_labels, 0)?;
                let scope = ResetScope::ALL[idx];
                let reset_workspace = working
                    .workspace()
                    .map(resolve_user_path)
                    .unwrap_or_else(|| paths.default_workspace());
                reset::handle_reset(scope, &reset_workspace, paths)
                    .map_err(WizardError::Config)?;
                // prior in-memory choices are discarded; the locale the
                // user just picked is not
                working = ConfigDocument::default().with_language(&locale_tag);
            }
            _ => {}
        }
    }

    // 7: quickstart defaults from whatever survived step 6
    at(WizardStep::QuickstartDefaults);
    let defaults = QuickstartGatewayDefaults::from_config(&working);
    if run_flow == WizardFlow::Quickstart {
        if defaults.has_existing {
            prompter.note(&format!("Keeping gateway settings: {}", defaults.summary()));
        } else {
            prompter.note(&format!("Gateway defaults: {}", defaults.summary()));
        }
    }

    // 8: reachability probes, joined; failures only alter hint text
    at(WizardStep::Probe);
    let creds = ProbeCredentials::from_config_or_env(&working);
    let local_url = format!("ws://127.0.0.1:{}", working.gateway_port());
    let remote_url = working.remote_url().map(str::to_string);
    let (local_probe, remote_probe) = tokio::join!(probe_gateway(&local_url, &creds), async {
        match &remote_url {
            Some(url) => Some(probe_gateway(url, &creds).await),
            None => None,
        }
    });

    // 9: mode
    at(WizardStep::ModeSelect);
    let mode = match flow::preselected_mode(opts.mode, run_flow) {
        Some(mode) => mode,
        None => {
            let local_hint = probe_hint(&local_probe);
            let remote_hint = remote_probe
                .as_ref()
                .map(probe_hint)
                .unwrap_or_else(|| "not configured yet".to_string());
            let local_label = format!("local gateway on this machine ({local_hint})");
            let remote_label = format!("remote gateway elsewhere ({remote_hint})");
            let idx = prompter.select(
                "Where does the gateway run?",
                &[local_label.as_str(), remote_label.as_str()],
                0,
            )?;
            if idx == 1 { Mode::Remote } else { Mode::Local }
        }
    };

    // 10: remote short-circuit
    if mode == Mode::Remote {
        at(WizardStep::RemoteSetup);
        working = delegates.prompt_remote_gateway(working, prompter).await?;
        working = working
            .with_gateway_mode(Mode::Remote.as_str())
            .with_wizard_metadata("onboard", Mode::Remote.as_str());
        config::write_config(paths, &working).map_err(WizardError::Config)?;
        at(WizardStep::Done);
        prompter.outro("Remote gateway configured. This machine will connect to it on startup.");
        return Ok(WizardOutcome::RemoteConfigured);
    }

    // 11-12: workspace, normalized to an absolute path
    at(WizardStep::Workspace);
    let workspace_raw = match &opts.workspace {
        Some(dir) => dir.clone(),
        None => {
            let existing = working.workspace().map(str::to_string);
            match run_flow {
                WizardFlow::Quickstart => {
                    existing.unwrap_or_else(|| DEFAULT_WORKSPACE.to_string())
                }
                WizardFlow::Advanced => prompter.text(
                    "Agent workspace directory",
                    Some(existing.as_deref().unwrap_or(DEFAULT_WORKSPACE)),
                )?,
            }
        }
    };
    let workspace: PathBuf = resolve_user_path(&workspace_raw);
    working = working
        .with_workspace(&workspace.to_string_lossy())
        .with_gateway_mode(Mode::Local.as_str());

    // 13: authentication
    at(WizardStep::Auth);
    let (auth_choice, from_prompt) = match &opts.auth_choice {
        Some(raw) => (auth::parse_auth_choice(raw)?, false),
        None => {
            let include_skip = working.provider.is_some();
            (
                delegates.prompt_auth_choice(prompter, include_skip).await?,
                true,
            )
        }
    };
    working = delegates
        .apply_auth_choice(auth_choice, working, prompter)
        .await?;
    if from_prompt && !matches!(auth_choice, AuthChoice::CustomApiKey | AuthChoice::Skip) {
        let provider_id = working
            .provider
            .as_ref()
            .and_then(|p| p.id.clone());
        if let Some(model) = delegates
            .prompt_default_model(prompter, provider_id.as_deref())
            .await?
        {
            working = working.with_default_model(&model);
        }
    }

    // 14: non-fatal model sanity check
    if let Some(warning) = auth::warn_if_model_config_looks_off(&working) {
        prompter.note(&warning);
    }

    // 15: gateway network/auth/exposure
    at(WizardStep::GatewayConfig);
    let configured = configure_gateway(GatewayConfigArgs {
        flow: run_flow,
        config: working,
        defaults: &defaults,
        prompter,
    })?;
    working = configured.config;
    tracing::debug!(settings = ?configured.settings, "gateway configured");

    // 16: channels
    if !opts.skip_channels {
        at(WizardStep::Channels);
        working = delegates.setup_channels(working, run_flow, prompter).await?;
    }

    // 17: first persist, then workspace/session bootstrap
    config::write_config(paths, &working).map_err(WizardError::Config)?;
    at(WizardStep::Bootstrap);
    if !working.skip_bootstrap() {
        fs::create_dir_all(&workspace)?;
        fs::create_dir_all(paths.sessions_dir())?;
    }

    // 18: skills
    if !opts.skip_skills {
        at(WizardStep::Skills);
        working = delegates
            .setup_skills(working, &workspace, prompter)
            .await?;
    }

    // 19: hooks
    at(WizardStep::Hooks);
    working = delegates.setup_internal_hooks(working, prompter).await?;

    // 20: stamp metadata and persist the final document
    working = working.with_wizard_metadata("onboard", mode.as_str());
    config::write_config(paths, &working).map_err(WizardError::Config)?;

    // 21: finalize; a launched dashboard owns the terminal from here
    at(WizardStep::Finalize);
    let outcome = delegates.finalize(&working, prompter).await?;
    at(WizardStep::Done);
    tracing::info!(
        launched_dashboard = outcome.launched_dashboard,
        "setup complete"
    );
    Ok(WizardOutcome::Completed)
}

fn probe_hint(outcome: &ProbeOutcome) -> String {
    if outcome.ok {
        outcome.status.clone()
    } else {
        match &outcome.error {
            Some(e) => format!("unreachable: {e}"),
            None => "unreachable".to_string(),
        }
    }
}
