//! Gateway reachability probe.
//!
//! A probe is a short-lived TCP connect to the gateway endpoint. It is
//! advisory only: the outcome adjusts hint text in the mode prompt and
//! never blocks or fails the wizard.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::config::{ConfigDocument, SecretString};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub const GATEWAY_TOKEN_ENV: &str = "CRABGATE_GATEWAY_TOKEN";
pub const GATEWAY_PASSWORD_ENV: &str = "CRABGATE_GATEWAY_PASSWORD";

/// Credentials the probe would authenticate with, if it had to.
#[derive(Debug, Clone, Default)]
pub struct ProbeCredentials {
    pub token: Option<SecretString>,
    pub password: Option<SecretString>,
}

impl ProbeCredentials {
    /// Credentials from the document, falling back to the environment.
    pub fn from_config_or_env(config: &ConfigDocument) -> Self {
        let token = config
            .gateway_auth_token()
            .map(SecretString::from)
            .or_else(|| SecretString::from_env(GATEWAY_TOKEN_ENV));
        let password = config
            .gateway_auth_password()
            .map(SecretString::from)
            .or_else(|| SecretString::from_env(GATEWAY_PASSWORD_ENV));
        Self { token, password }
    }

    pub fn present(&self) -> bool {
        self.token.is_some() || self.password.is_some()
    }
}

/// Result of one reachability probe. `ok=false` covers every failure:
/// bad URL, resolution failure, refusal, timeout.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub status: String,
    pub error: Option<String>,
}

impl ProbeOutcome {
    fn reachable(status: String) -> Self {
        Self {
            ok: true,
            status,
            error: None,
        }
    }

    fn unreachable(error: String) -> Self {
        Self {
            ok: false,
            status: "unreachable".to_string(),
            error: Some(error),
        }
    }
}

/// Probe a gateway endpoint. Resolves within `PROBE_TIMEOUT`; never
/// panics, never errors.
pub async fn probe_gateway(url: &str, creds: &ProbeCredentials) -> ProbeOutcome {
    let (host, port) = match endpoint_from_url(url) {
        Ok(pair) => pair,
        Err(e) => return ProbeOutcome::unreachable(e),
    };

    match timeout(PROBE_TIMEOUT, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_stream)) => {
            let status = if creds.present() {
                format!("reachable at {host}:{port}")
            } else {
                format!("reachable at {host}:{port} (no credentials on hand)")
            };
            ProbeOutcome::reachable(status)
        }
        Ok(Err(e)) => ProbeOutcome::unreachable(format!("{host}:{port}: {e}")),
        Err(_) => ProbeOutcome::unreachable(format!(
            "{host}:{port}: no answer within {}s",
            PROBE_TIMEOUT.as_secs()
        )),
    }
}

/// Extract host and port from a ws/wss/http/https URL, applying the
/// scheme's default port when none is given.
fn endpoint_from_url(raw: &str) -> Result<(String, u16), String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| format!("'{trimmed}': {e}"))?;

    let default_port = match parsed.scheme() {
        "ws" | "http" => 80,
        "wss" | "https" => 443,
        other => return Err(format!("unsupported scheme '{other}'")),
    };
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("'{trimmed}' has no host"))?;

    Ok((host.to_string(), parsed.port().unwrap_or(default_port)))
}
