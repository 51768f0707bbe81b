//! Gateway configurator.
//!
//! Determines port, bind mode, auth mode, and Tailscale exposure for a
//! local gateway. Quickstart reuses whatever the document already has
//! (or fixed defaults on a blank slate) without prompting; advanced
//! prompts each dimension independently, pre-filled from the same
//! derived defaults.

use crate::config::{ConfigDocument, DEFAULT_GATEWAY_PORT};
use crate::error::WizardError;

use super::flow::WizardFlow;
use super::prompts::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    Loopback,
    Lan,
    Auto,
    Custom,
    Tailnet,
}

impl BindMode {
    pub const ALL: [BindMode; 5] = [
        BindMode::Loopback,
        BindMode::Lan,
        BindMode::Auto,
        BindMode::Custom,
        BindMode::Tailnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loopback => "loopback",
            Self::Lan => "lan",
            Self::Auto => "auto",
            Self::Custom => "custom",
            Self::Tailnet => "tailnet",
        }
    }

    /// Unrecognized persisted values collapse to loopback when used as
    /// a prompt default; the document itself keeps the raw string.
    pub fn parse_or_loopback(raw: Option<&str>) -> Self {
        match raw {
            Some("lan") => Self::Lan,
            Some("auto") => Self::Auto,
            Some("custom") => Self::Custom,
            Some("tailnet") => Self::Tailnet,
            _ => Self::Loopback,
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayAuthChoice {
    Token,
    Password,
}

impl GatewayAuthChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Password => "password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailscaleMode {
    Off,
    Serve,
    Funnel,
}

impl TailscaleMode {
    pub const ALL: [TailscaleMode; 3] =
        [TailscaleMode::Off, TailscaleMode::Serve, TailscaleMode::Funnel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Serve => "serve",
            Self::Funnel => "funnel",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

/// Read-only snapshot of existing gateway settings, used to pre-fill
/// prompts and decide whether quickstart has anything to keep.
#[derive(Debug, Clone)]
pub struct QuickstartGatewayDefaults {
    pub has_existing: bool,
    pub port: u16,
    pub bind: BindMode,
    pub auth_mode: GatewayAuthChoice,
    pub token: Option<String>,
    pub password: Option<String>,
    pub custom_bind_host: Option<String>,
    pub tailscale: TailscaleMode,
    pub tailscale_reset_on_exit: bool,
}

impl QuickstartGatewayDefaults {
    /// Pure derivation from the surviving base config. No side effects.
    pub fn from_config(config: &ConfigDocument) -> Self {
        let gateway = config.gateway.as_ref();
        let auth = gateway.and_then(|g| g.auth.as_ref());
        let tailscale = gateway.and_then(|g| g.tailscale.as_ref());

        let has_existing = gateway.is_some_and(|g| {
            g.port.is_some()
                || g.bind.is_some()
                || g.auth.is_some()
                || g.custom_bind_host.is_some()
                || g.tailscale.is_some()
        });

        // Explicit mode wins; otherwise infer from whichever credential
        // is stored, so a password-only document never pre-selects token.
        let auth_mode = match auth.and_then(|a| a.mode.as_deref()) {
            Some("password") => GatewayAuthChoice::Password,
            Some(_) => GatewayAuthChoice::Token,
            None if auth.is_some_and(|a| a.token.is_some()) => GatewayAuthChoice::Token,
            None if auth.is_some_and(|a| a.password.is_some()) => GatewayAuthChoice::Password,
            None => GatewayAuthChoice::Token,
        };
        let ts_mode = match tailscale.and_then(|t| t.mode.as_deref()) {
            Some("serve") => TailscaleMode::Serve,
            Some("funnel") => TailscaleMode::Funnel,
            _ => TailscaleMode::Off,
        };

        Self {
            has_existing,
            port: config.gateway_port(),
            bind: BindMode::parse_or_loopback(gateway.and_then(|g| g.bind.as_deref())),
            auth_mode,
            token: auth.and_then(|a| a.token.clone()),
            password: auth.and_then(|a| a.password.clone()),
            custom_bind_host: gateway.and_then(|g| g.custom_bind_host.clone()),
            tailscale: ts_mode,
            tailscale_reset_on_exit: tailscale
                .and_then(|t| t.reset_on_exit)
                .unwrap_or(false),
        }
    }

    /// One-line-per-setting summary for the quickstart note.
    pub fn summary(&self) -> String {
        format!(
            "port {} / bind {} / auth {} / tailscale {}",
            self.port,
            self.bind.as_str(),
            self.auth_mode.as_str(),
            self.tailscale.as_str()
        )
    }
}

/// The settings the configurator resolved, alongside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub port: u16,
    pub bind: BindMode,
    pub custom_bind_host: Option<String>,
    pub auth_mode: GatewayAuthChoice,
    pub tailscale: TailscaleMode,
    pub tailscale_reset_on_exit: bool,
}

pub struct GatewayConfigured {
    pub config: ConfigDocument,
    pub settings: GatewaySettings,
}

pub struct GatewayConfigArgs<'a> {
    pub flow: WizardFlow,
    pub config: ConfigDocument,
    pub defaults: &'a QuickstartGatewayDefaults,
    pub prompter: &'a dyn Prompter,
}

/// Resolve gateway settings for a local gateway.
///
/// An explicit auth choice is written through unchanged; the credential
/// for the mode not chosen stays in the document untouched.
pub fn configure_gateway(args: GatewayConfigArgs<'_>) -> Result<GatewayConfigured, WizardError> {
    let GatewayConfigArgs {
        flow,
        config,
        defaults,
        prompter,
    } = args;

    if flow == WizardFlow::Quickstart {
        if defaults.has_existing {
            // The defaults are the existing settings; nothing to write.
            return Ok(GatewayConfigured {
                settings: settings_from_defaults(defaults),
                config,
            });
        }
        let config = config
            .with_gateway_network(DEFAULT_GATEWAY_PORT, BindMode::Loopback.as_str(), None)
            .with_gateway_auth(GatewayAuthChoice::Token.as_str(), None)
            .with_tailscale(TailscaleMode::Off.as_str(), false);
        return Ok(GatewayConfigured {
            settings: GatewaySettings {
                port: DEFAULT_GATEWAY_PORT,
                bind: BindMode::Loopback,
                custom_bind_host: None,
                auth_mode: GatewayAuthChoice::Token,
                tailscale: TailscaleMode::Off,
                tailscale_reset_on_exit: false,
            },
            config,
        });
    }

    // advanced: prompt each dimension, pre-filled from the defaults
    let port = prompt_port(prompter, defaults.port)?;

    let bind_labels: Vec<&str> = BindMode::ALL.iter().map(|m| m.as_str()).collect();
    let bind = BindMode::ALL
        [prompter.select("Gateway bind mode", &bind_labels, defaults.bind.index())?];
    let custom_bind_host = if bind == BindMode::Custom {
        let host = prompter.text(
            "Bind host/interface",
            defaults.custom_bind_host.as_deref().or(Some("0.0.0.0")),
        )?;
        Some(host)
    } else {
        None
    };

    let auth_default = match defaults.auth_mode {
        GatewayAuthChoice::Token => 0,
        GatewayAuthChoice::Password => 1,
    };
    let auth_mode = match prompter.select(
        "Gateway authentication",
        &["token (generated)", "password"],
        auth_default,
    )? {
        1 => GatewayAuthChoice::Password,
        _ => GatewayAuthChoice::Token,
    };
    let credential = if auth_mode == GatewayAuthChoice::Password && defaults.password.is_none() {
        Some(prompter.text("Gateway password", None)?)
    } else {
        None
    };

    let ts_labels: Vec<&str> = TailscaleMode::ALL.iter().map(|m| m.as_str()).collect();
    let tailscale = TailscaleMode::ALL[prompter.select(
        "Tailscale exposure",
        &ts_labels,
        defaults.tailscale.index(),
    )?];
    let reset_on_exit = if tailscale == TailscaleMode::Off {
        false
    } else {
        prompter.confirm(
            "Tear down Tailscale exposure on exit?",
            defaults.tailscale_reset_on_exit,
        )?
    };

    let config = config
        .with_gateway_network(port, bind.as_str(), custom_bind_host.as_deref())
        .with_gateway_auth(auth_mode.as_str(), credential.as_deref())
        .with_tailscale(tailscale.as_str(), reset_on_exit);

    Ok(GatewayConfigured {
        settings: GatewaySettings {
            port,
            bind,
            custom_bind_host,
            auth_mode,
            tailscale,
            tailscale_reset_on_exit: reset_on_exit,
        },
        config,
    })
}

fn settings_from_defaults(defaults: &QuickstartGatewayDefaults) -> GatewaySettings {
    GatewaySettings {
        port: defaults.port,
        bind: defaults.bind,
        custom_bind_host: defaults.custom_bind_host.clone(),
        auth_mode: defaults.auth_mode,
        tailscale: defaults.tailscale,
        tailscale_reset_on_exit: defaults.tailscale_reset_on_exit,
    }
}

fn prompt_port(prompter: &dyn Prompter, default: u16) -> Result<u16, WizardError> {
    loop {
        let raw = prompter.text("Gateway port", Some(&default.to_string()))?;
        match raw.trim().parse::<u16>() {
            Ok(p) if p > 0 => return Ok(p),
            _ => prompter.note(&format!("'{raw}' is not a valid port (1-65535)")),
        }
    }
}
