//! Configuration document model, defaults, and per-section merge helpers.
//!
//! Every field is optional: absence means "use computed default", never
//! "invalid". The wizard builds the document by progressively merging the
//! loaded snapshot with user choices; each merge helper consumes the
//! document and returns a new value so later steps never discard earlier
//! unrelated fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default gateway port
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

/// Default agent workspace, relative to the user's home
pub const DEFAULT_WORKSPACE: &str = "~/.crabgate/workspace";

/// Main configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// UI locale tag ("en", "zh-CN")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Agent defaults (workspace, bootstrap behaviour)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentsSection>,

    /// Gateway network/auth/exposure settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewaySection>,

    /// AI provider the agent runs against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSection>,

    /// Messaging channel integrations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<ChannelsSection>,

    /// Installed skills
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillsSection>,

    /// Automation hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksSection>,

    /// Metadata stamped by the last wizard run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<AgentDefaults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
    /// Agent workspace directory (absolute after the wizard normalizes it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    /// Skip seeding the workspace/session directories on persist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_bootstrap: Option<bool>,
}

/// Gateway settings. `bind`, `auth.mode`, and `tailscale.mode` are stored
/// as strings so unrecognized persisted values survive a round-trip;
/// defaults derivation collapses them to known values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewaySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind mode: "loopback", "lan", "auto", "custom", "tailnet"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<GatewayAuthSection>,

    /// Host to bind when bind = "custom"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_bind_host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tailscale: Option<TailscaleSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteGatewaySection>,

    /// "local" or "remote"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayAuthSection {
    /// "token" or "password"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailscaleSection {
    /// "off", "serve", "funnel"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_on_exit: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteGatewaySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSection {
    /// Provider id ("openai", "anthropic", "openrouter", or a custom id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Endpoint override for custom/OpenAI-compatible providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<ChannelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<ChannelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<ChannelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<ChannelEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Allowlisted sender IDs; "*" means everyone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<Vec<String>>,

    /// "open", "allowlist", or "ignore" for direct messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dm_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HooksSection {
    /// Capture session memory when a conversation is reset with /new
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_memory: Option<bool>,
}

/// Stamped by the wizard on completion. Deliberately free of timestamps
/// so repeated runs with identical inputs produce identical documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ConfigDocument {
    /// Resolved gateway port (documented default when absent).
    pub fn gateway_port(&self) -> u16 {
        self.gateway
            .as_ref()
            .and_then(|g| g.port)
            .unwrap_or(DEFAULT_GATEWAY_PORT)
    }

    /// Configured workspace, if any.
    pub fn workspace(&self) -> Option<&str> {
        self.agents
            .as_ref()
            .and_then(|a| a.defaults.as_ref())
            .and_then(|d| d.workspace.as_deref())
    }

    pub fn skip_bootstrap(&self) -> bool {
        self.agents
            .as_ref()
            .and_then(|a| a.defaults.as_ref())
            .and_then(|d| d.skip_bootstrap)
            .unwrap_or(false)
    }

    pub fn gateway_auth_token(&self) -> Option<&str> {
        self.gateway
            .as_ref()
            .and_then(|g| g.auth.as_ref())
            .and_then(|a| a.token.as_deref())
    }

    pub fn gateway_auth_password(&self) -> Option<&str> {
        self.gateway
            .as_ref()
            .and_then(|g| g.auth.as_ref())
            .and_then(|a| a.password.as_deref())
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.gateway
            .as_ref()
            .and_then(|g| g.remote.as_ref())
            .and_then(|r| r.url.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn remote_token(&self) -> Option<&str> {
        self.gateway
            .as_ref()
            .and_then(|g| g.remote.as_ref())
            .and_then(|r| r.token.as_deref())
    }

    // ── per-section merge helpers ────────────────────────────────

    /// Merge a locale choice. Leaves every other field untouched.
    pub fn with_language(mut self, tag: &str) -> Self {
        self.language = Some(tag.to_string());
        self
    }

    /// Merge a workspace choice into `agents.defaults.workspace`.
    pub fn with_workspace(mut self, dir: &str) -> Self {
        let agents = self.agents.get_or_insert_with(AgentsSection::default);
        let defaults = agents.defaults.get_or_insert_with(AgentDefaults::default);
        defaults.workspace = Some(dir.to_string());
        self
    }

    /// Merge the gateway mode ("local" / "remote").
    pub fn with_gateway_mode(mut self, mode: &str) -> Self {
        let gateway = self.gateway.get_or_insert_with(GatewaySection::default);
        gateway.mode = Some(mode.to_string());
        self
    }

    /// Merge gateway network settings. `custom_bind_host` is only
    /// meaningful for `bind = "custom"`; passing `None` clears it.
    pub fn with_gateway_network(
        mut self,
        port: u16,
        bind: &str,
        custom_bind_host: Option<&str>,
    ) -> Self {
        let gateway = self.gateway.get_or_insert_with(GatewaySection::default);
        gateway.port = Some(port);
        gateway.bind = Some(bind.to_string());
        gateway.custom_bind_host = custom_bind_host.map(str::to_string);
        self
    }

    /// Merge the gateway auth mode. The credential for the *other* mode
    /// is left untouched so an explicit choice is never downgraded.
    pub fn with_gateway_auth(mut self, mode: &str, credential: Option<&str>) -> Self {
        let gateway = self.gateway.get_or_insert_with(GatewaySection::default);
        let auth = gateway.auth.get_or_insert_with(GatewayAuthSection::default);
        auth.mode = Some(mode.to_string());
        match mode {
            "password" => {
                if let Some(cred) = credential {
                    auth.password = Some(cred.to_string());
                }
            }
            _ => {
                if let Some(cred) = credential {
                    auth.token = Some(cred.to_string());
                }
            }
        }
        self
    }

    /// Merge Tailscale exposure settings.
    pub fn with_tailscale(mut self, mode: &str, reset_on_exit: bool) -> Self {
        let gateway = self.gateway.get_or_insert_with(GatewaySection::default);
        let ts = gateway.tailscale.get_or_insert_with(TailscaleSection::default);
        ts.mode = Some(mode.to_string());
        ts.reset_on_exit = Some(reset_on_exit);
        self
    }

    /// Merge remote gateway coordinates.
    pub fn with_remote(mut self, url: &str, token: Option<&str>) -> Self {
        let gateway = self.gateway.get_or_insert_with(GatewaySection::default);
        let remote = gateway.remote.get_or_insert_with(RemoteGatewaySection::default);
        remote.url = Some(url.to_string());
        if let Some(token) = token {
            remote.token = Some(token.to_string());
        }
        self
    }

    /// Merge a provider selection. Fields passed as `None` are left as
    /// they were.
    pub fn with_provider(
        mut self,
        id: &str,
        base_url: Option<&str>,
        api_key: Option<&str>,
    ) -> Self {
        let provider = self.provider.get_or_insert_with(ProviderSection::default);
        provider.id = Some(id.to_string());
        if let Some(url) = base_url {
            provider.base_url = Some(url.to_string());
        }
        if let Some(key) = api_key {
            provider.api_key = Some(key.to_string());
        }
        self
    }

    /// Merge a default model choice.
    pub fn with_default_model(mut self, model: &str) -> Self {
        let provider = self.provider.get_or_insert_with(ProviderSection::default);
        provider.default_model = Some(model.to_string());
        self
    }

    /// Stamp wizard metadata (command name and resolved mode).
    pub fn with_wizard_metadata(mut self, command: &str, mode: &str) -> Self {
        self.wizard = Some(WizardMetadata {
            command: Some(command.to_string()),
            mode: Some(mode.to_string()),
        });
        self
    }

    /// Human-readable summary of what is currently configured, shown
    /// before the keep/modify/reset decision and in the finalize outro.
    pub fn summarize(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("gateway mode: {}", self.mode_label()));
        lines.push(format!("gateway port: {}", self.gateway_port()));
        if let Some(bind) = self.gateway.as_ref().and_then(|g| g.bind.as_deref()) {
            lines.push(format!("gateway bind: {bind}"));
        }
        if let Some(mode) = self
            .gateway
            .as_ref()
            .and_then(|g| g.auth.as_ref())
            .and_then(|a| a.mode.as_deref())
        {
            lines.push(format!("gateway auth: {mode}"));
        }
        if let Some(url) = self.remote_url() {
            lines.push(format!("remote url: {url}"));
        }
        if let Some(ws) = self.workspace() {
            lines.push(format!("workspace: {ws}"));
        }
        if let Some(provider) = self.provider.as_ref().and_then(|p| p.id.as_deref()) {
            let model = self
                .provider
                .as_ref()
                .and_then(|p| p.default_model.as_deref())
                .unwrap_or("unset");
            lines.push(format!("provider: {provider} (model: {model})"));
        }
        let enabled = self.enabled_channels();
        if !enabled.is_empty() {
            lines.push(format!("channels: {}", enabled.join(", ")));
        }
        lines.join("\n")
    }

    fn mode_label(&self) -> &str {
        self.gateway
            .as_ref()
            .and_then(|g| g.mode.as_deref())
            .unwrap_or("unset")
    }

    /// Names of channels with `enabled = true`.
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        let Some(channels) = self.channels.as_ref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let entries: [(&'static str, Option<&ChannelEntry>); 4] = [
            ("telegram", channels.telegram.as_ref()),
            ("discord", channels.discord.as_ref()),
            ("slack", channels.slack.as_ref()),
            ("whatsapp", channels.whatsapp.as_ref()),
        ];
        for (name, entry) in entries {
            if entry.is_some_and(|e| e.enabled == Some(true)) {
                out.push(name);
            }
        }
        out
    }

    /// Copy of the document with every credential field replaced by a
    /// placeholder, for display.
    pub fn redacted(&self) -> Self {
        const PLACEHOLDER: &str = "[REDACTED]";
        let mut doc = self.clone();
        if let Some(gateway) = doc.gateway.as_mut() {
            if let Some(auth) = gateway.auth.as_mut() {
                if auth.token.is_some() {
                    auth.token = Some(PLACEHOLDER.to_string());
                }
                if auth.password.is_some() {
                    auth.password = Some(PLACEHOLDER.to_string());
                }
            }
            if let Some(remote) = gateway.remote.as_mut() {
                if remote.token.is_some() {
                    remote.token = Some(PLACEHOLDER.to_string());
                }
            }
        }
        if let Some(provider) = doc.provider.as_mut() {
            if provider.api_key.is_some() {
                provider.api_key = Some(PLACEHOLDER.to_string());
            }
        }
        if let Some(channels) = doc.channels.as_mut() {
            for entry in [
                channels.telegram.as_mut(),
                channels.discord.as_mut(),
                channels.slack.as_mut(),
                channels.whatsapp.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                if entry.token.is_some() {
                    entry.token = Some(PLACEHOLDER.to_string());
                }
            }
        }
        doc
    }
}

// ── paths ────────────────────────────────────────────────────────

/// Canonical on-disk layout: config, credential store, and session
/// history all live under the crabgate home directory.
#[derive(Debug, Clone)]
pub struct GatePaths {
    home: PathBuf,
}

impl GatePaths {
    /// Resolve the home directory: `CRABGATE_HOME` override, else
    /// `~/.crabgate`.
    pub fn resolve() -> Self {
        if let Ok(dir) = std::env::var("CRABGATE_HOME") {
            if !dir.trim().is_empty() {
                return Self { home: PathBuf::from(dir) };
            }
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self { home: home.join(".crabgate") }
    }

    /// Build paths rooted at an explicit directory (tests).
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Credential store (tokens, API keys). Cleared by the
    /// config+creds+sessions reset scope.
    pub fn keys_path(&self) -> PathBuf {
        self.home.join("keys.toml")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.home.join("sessions")
    }

    pub fn default_workspace(&self) -> PathBuf {
        self.home.join("workspace")
    }
}

/// Expand a leading `~` and normalize to an absolute path.
pub fn resolve_user_path(input: &str) -> PathBuf {
    let trimmed = input.trim();
    let expanded = if trimmed == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(trimmed)
    };
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_serializes_to_nothing() {
        let doc = ConfigDocument::default();
        let toml_str = toml::to_string_pretty(&doc).unwrap();
        assert!(toml_str.is_empty(), "got: {toml_str}");
    }

    #[test]
    fn gateway_port_falls_back_to_default() {
        let doc = ConfigDocument::default();
        assert_eq!(doc.gateway_port(), DEFAULT_GATEWAY_PORT);

        let doc = ConfigDocument::default().with_gateway_network(9000, "lan", None);
        assert_eq!(doc.gateway_port(), 9000);
    }

    #[test]
    fn merge_helpers_preserve_unrelated_fields() {
        let doc = ConfigDocument::default()
            .with_language("zh-CN")
            .with_workspace("/tmp/ws")
            .with_gateway_mode("local")
            .with_gateway_network(8080, "lan", None)
            .with_gateway_auth("token", Some("secret"))
            .with_tailscale("serve", true);

        assert_eq!(doc.language.as_deref(), Some("zh-CN"));
        assert_eq!(doc.workspace(), Some("/tmp/ws"));
        let gateway = doc.gateway.as_ref().unwrap();
        assert_eq!(gateway.mode.as_deref(), Some("local"));
        assert_eq!(gateway.port, Some(8080));
        assert_eq!(gateway.bind.as_deref(), Some("lan"));
        assert_eq!(doc.gateway_auth_token(), Some("secret"));
        assert_eq!(
            gateway.tailscale.as_ref().unwrap().mode.as_deref(),
            Some("serve")
        );
    }

    #[test]
    fn auth_merge_never_touches_other_credential() {
        let doc = ConfigDocument::default()
            .with_gateway_auth("password", Some("hunter2"))
            .with_gateway_auth("token", Some("tok"));
        // Switching modes keeps the password on record
        assert_eq!(doc.gateway_auth_password(), Some("hunter2"));
        assert_eq!(doc.gateway_auth_token(), Some("tok"));
        let auth = doc.gateway.unwrap().auth.unwrap();
        assert_eq!(auth.mode.as_deref(), Some("token"));
    }

    #[test]
    fn remote_url_trims_and_rejects_empty() {
        let doc = ConfigDocument::default().with_remote("  ", None);
        assert_eq!(doc.remote_url(), None);

        let doc = ConfigDocument::default().with_remote(" ws://host:18789 ", Some("t"));
        // stored verbatim, trimmed on read
        assert_eq!(doc.remote_url(), Some("ws://host:18789"));
    }

    #[test]
    fn document_round_trips_through_toml() {
        let doc = ConfigDocument::default()
            .with_language("en")
            .with_workspace("/home/u/ws")
            .with_gateway_network(18789, "loopback", None)
            .with_gateway_auth("token", Some("abc"))
            .with_wizard_metadata("onboard", "local");

        let text = toml::to_string_pretty(&doc).unwrap();
        let back: ConfigDocument = toml::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn unknown_bind_value_round_trips_untouched() {
        let doc: ConfigDocument = toml::from_str("[gateway]\nbind = \"mystery\"\n").unwrap();
        assert_eq!(
            doc.gateway.as_ref().unwrap().bind.as_deref(),
            Some("mystery")
        );
    }

    #[test]
    fn resolve_user_path_expands_tilde() {
        let p = resolve_user_path("~/ws");
        assert!(p.is_absolute());
        assert!(p.ends_with("ws"));
    }

    #[test]
    fn gate_paths_layout() {
        let paths = GatePaths::from_home("/tmp/gate-home");
        assert_eq!(paths.config_path(), PathBuf::from("/tmp/gate-home/config.toml"));
        assert_eq!(paths.keys_path(), PathBuf::from("/tmp/gate-home/keys.toml"));
        assert_eq!(paths.sessions_dir(), PathBuf::from("/tmp/gate-home/sessions"));
    }

    #[test]
    fn summarize_lists_enabled_channels() {
        let mut doc = ConfigDocument::default().with_gateway_mode("local");
        doc.channels = Some(ChannelsSection {
            telegram: Some(ChannelEntry {
                enabled: Some(true),
                ..ChannelEntry::default()
            }),
            discord: Some(ChannelEntry {
                enabled: Some(false),
                ..ChannelEntry::default()
            }),
            ..ChannelsSection::default()
        });
        let summary = doc.summarize();
        assert!(summary.contains("channels: telegram"));
        assert!(!summary.contains("discord"));
    }
}
