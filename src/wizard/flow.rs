//! Flow and mode selection.
//!
//! Pure decision helpers, kept free of prompting so every branch is
//! unit-testable. The orchestrator asks the prompter only when these
//! helpers return no answer.

use crate::error::WizardError;

/// How much the wizard asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardFlow {
    /// Sensible defaults, minimal prompting.
    Quickstart,
    /// Every knob prompted.
    Advanced,
}

impl WizardFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quickstart => "quickstart",
            Self::Advanced => "advanced",
        }
    }
}

/// Where the gateway runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Wizard progress, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Start,
    Locale,
    RiskAck,
    FlowSelect,
    ExistingConfig,
    QuickstartDefaults,
    Probe,
    ModeSelect,
    RemoteSetup,
    Workspace,
    Auth,
    GatewayConfig,
    Channels,
    Bootstrap,
    Skills,
    Hooks,
    Finalize,
    Done,
}

/// Parse an explicit `--flow` value. `manual` is an accepted alias for
/// advanced; anything else is a fatal input error raised before any
/// prompt is shown.
pub fn parse_flow(raw: &str) -> Result<WizardFlow, WizardError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "quickstart" => Ok(WizardFlow::Quickstart),
        "advanced" | "manual" => Ok(WizardFlow::Advanced),
        _ => Err(WizardError::InvalidFlow(raw.to_string())),
    }
}

/// Remote setup has no quickstart path. Returns the flow to actually
/// run plus whether the request was overridden.
pub fn effective_flow(requested: WizardFlow, mode: Option<Mode>) -> (WizardFlow, bool) {
    if mode == Some(Mode::Remote) && requested == WizardFlow::Quickstart {
        (WizardFlow::Advanced, true)
    } else {
        (requested, false)
    }
}

/// Mode known without prompting: an explicit option wins, and
/// quickstart always means a local gateway.
pub fn preselected_mode(explicit: Option<Mode>, flow: WizardFlow) -> Option<Mode> {
    explicit.or(match flow {
        WizardFlow::Quickstart => Some(Mode::Local),
        WizardFlow::Advanced => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_is_an_alias_for_advanced() {
        assert_eq!(parse_flow("manual").unwrap(), WizardFlow::Advanced);
        assert_eq!(parse_flow("advanced").unwrap(), WizardFlow::Advanced);
        assert_eq!(parse_flow("Quickstart").unwrap(), WizardFlow::Quickstart);
    }

    #[test]
    fn unknown_flow_is_fatal() {
        let err = parse_flow("express").unwrap_err();
        match err {
            WizardError::InvalidFlow(v) => assert_eq!(v, "express"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn remote_mode_forces_advanced() {
        let (flow, forced) = effective_flow(WizardFlow::Quickstart, Some(Mode::Remote));
        assert_eq!(flow, WizardFlow::Advanced);
        assert!(forced);

        let (flow, forced) = effective_flow(WizardFlow::Quickstart, Some(Mode::Local));
        assert_eq!(flow, WizardFlow::Quickstart);
        assert!(!forced);

        let (flow, forced) = effective_flow(WizardFlow::Advanced, Some(Mode::Remote));
        assert_eq!(flow, WizardFlow::Advanced);
        assert!(!forced);
    }

    #[test]
    fn quickstart_preselects_local() {
        assert_eq!(
            preselected_mode(None, WizardFlow::Quickstart),
            Some(Mode::Local)
        );
        assert_eq!(preselected_mode(None, WizardFlow::Advanced), None);
        assert_eq!(
            preselected_mode(Some(Mode::Remote), WizardFlow::Quickstart),
            Some(Mode::Remote)
        );
    }
}
