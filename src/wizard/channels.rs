//! Channel setup sub-flow.
//!
//! Enables messaging channel integrations and collects their tokens.
//! Only token shape is validated locally; an optional online check
//! (Telegram getMe) is offered in the advanced flow and its failure is
//! a note, never an abort.

use std::time::Duration;

use crate::config::{ChannelEntry, ChannelsSection, ConfigDocument};
use crate::error::WizardError;

use super::flow::WizardFlow;
use super::prompts::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Telegram,
    Discord,
    Slack,
    Whatsapp,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Telegram,
        ChannelKind::Discord,
        ChannelKind::Slack,
        ChannelKind::Whatsapp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Channels simple enough to switch on with defaults only.
    pub fn quickstart_eligible(&self) -> bool {
        matches!(self, Self::Telegram | Self::Discord)
    }

    /// Cheap local check that a token at least has the right shape.
    pub fn token_shape_ok(&self, token: &str) -> bool {
        let token = token.trim();
        match self {
            Self::Telegram => token
                .split_once(':')
                .is_some_and(|(id, rest)| id.chars().all(|c| c.is_ascii_digit()) && rest.len() >= 20),
            Self::Discord => token.len() >= 50,
            Self::Slack => token.starts_with("xoxb-") || token.starts_with("xapp-"),
            Self::Whatsapp => !token.is_empty(),
        }
    }
}

const DM_POLICIES: [&str; 3] = ["open", "allowlist", "ignore"];

/// Walk the channel catalog and merge the answers into the document.
///
/// Quickstart only offers the quickstart-eligible channels, auto-allows
/// every sender, and skips the DM-policy prompt. Advanced walks all
/// channels with full control.
pub async fn setup_channels(
    config: ConfigDocument,
    flow: WizardFlow,
    prompter: &dyn Prompter,
) -> Result<ConfigDocument, WizardError> {
    let mut channels = config.channels.clone().unwrap_or_default();

    for kind in ChannelKind::ALL {
        if flow == WizardFlow::Quickstart && !kind.quickstart_eligible() {
            continue;
        }
        let currently_enabled = current_entry(&channels, kind)
            .and_then(|e| e.enabled)
            .unwrap_or(false);

        let enable = prompter.confirm(
            &format!("Enable the {} channel?", kind.name()),
            currently_enabled,
        )?;
        if !enable {
            // only touch the section when turning something off
            if currently_enabled {
                entry_mut(&mut channels, kind).enabled = Some(false);
            }
            continue;
        }
        let entry = entry_mut(&mut channels, kind);
        entry.enabled = Some(true);

        let token = prompter.text(
            &format!("{} bot token", kind.name()),
            entry.token.as_deref().or(Some("")),
        )?;
        let token = token.trim().to_string();
        if !token.is_empty() {
            if !kind.token_shape_ok(&token) {
                prompter.note(&format!(
                    "that does not look like a {} token; keeping it anyway",
                    kind.name()
                ));
            } else if kind == ChannelKind::Telegram
                && flow == WizardFlow::Advanced
                && prompter.confirm("Verify the Telegram token online?", false)?
            {
                match verify_telegram_token(&token).await {
                    Ok(true) => prompter.note("token verified"),
                    Ok(false) => prompter.note("Telegram rejected the token; keeping it anyway"),
                    Err(e) => prompter.note(&format!("could not verify token: {e}")),
                }
            }
            entry.token = Some(token);
        }

        if flow == WizardFlow::Quickstart {
            // auto-allow with defaults; no confirmation or DM-policy prompt
            if entry.allow_from.is_none() {
                entry.allow_from = Some(vec!["*".to_string()]);
            }
        } else {
            let allow_raw = prompter.text(
                "Allowed sender IDs (comma-separated, * for everyone)",
                Some(&entry.allow_from.as_deref().map(|v| v.join(",")).unwrap_or_else(|| "*".to_string())),
            )?;
            let allow: Vec<String> = allow_raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !allow.is_empty() {
                entry.allow_from = Some(allow);
            }

            let current_policy = entry.dm_policy.as_deref().unwrap_or("open");
            let default_idx = DM_POLICIES
                .iter()
                .position(|p| *p == current_policy)
                .unwrap_or(0);
            let idx = prompter.select("Direct message policy", &DM_POLICIES, default_idx)?;
            entry.dm_policy = Some(DM_POLICIES[idx].to_string());
        }
    }

    let mut config = config;
    if channels != ChannelsSection::default() {
        config.channels = Some(channels);
    }
    Ok(config)
}

fn current_entry(channels: &ChannelsSection, kind: ChannelKind) -> Option<&ChannelEntry> {
    match kind {
        ChannelKind::Telegram => channels.telegram.as_ref(),
        ChannelKind::Discord => channels.discord.as_ref(),
        ChannelKind::Slack => channels.slack.as_ref(),
        ChannelKind::Whatsapp => channels.whatsapp.as_ref(),
    }
}

fn entry_mut(channels: &mut ChannelsSection, kind: ChannelKind) -> &mut ChannelEntry {
    let slot = match kind {
        ChannelKind::Telegram => &mut channels.telegram,
        ChannelKind::Discord => &mut channels.discord,
        ChannelKind::Slack => &mut channels.slack,
        ChannelKind::Whatsapp => &mut channels.whatsapp,
    };
    slot.get_or_insert_with(ChannelEntry::default)
}

/// Online token check against the Telegram Bot API.
async fn verify_telegram_token(token: &str) -> anyhow::Result<bool> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let resp = client
        .get(format!("https://api.telegram.org/bot{token}/getMe"))
        .send()
        .await?;
    Ok(resp.status().is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::prompts::{Answer, ScriptedPrompter};

    #[test]
    fn token_shapes() {
        assert!(ChannelKind::Telegram.token_shape_ok("123456:AAkq-zXciXcqnpGjTmEXAMPLEtoken"));
        assert!(!ChannelKind::Telegram.token_shape_ok("no-colon-here"));
        assert!(ChannelKind::Slack.token_shape_ok("xoxb-abc"));
        assert!(!ChannelKind::Slack.token_shape_ok("sk-abc"));
    }

    #[tokio::test]
    async fn quickstart_offers_only_eligible_channels_and_auto_allows() {
        // telegram: yes + token; discord: no
        let prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Text("123456:AAkq-zXciXcqnpGjTmEXAMPLEtoken".into()),
            Answer::Confirm(false),
        ]);

        let config = setup_channels(
            ConfigDocument::default(),
            WizardFlow::Quickstart,
            &prompter,
        )
        .await
        .unwrap();

        assert!(prompter.answers_exhausted(), "slack/whatsapp were prompted");
        let channels = config.channels.unwrap();
        let tg = channels.telegram.unwrap();
        assert_eq!(tg.enabled, Some(true));
        assert_eq!(tg.allow_from, Some(vec!["*".to_string()]));
        assert!(tg.dm_policy.is_none());
        assert!(channels.slack.is_none());
    }

    #[tokio::test]
    async fn advanced_collects_allowlist_and_dm_policy() {
        let prompter = ScriptedPrompter::new([
            Answer::Confirm(true),                   // enable telegram
            Answer::Text("123456:AAkq-zXciXcqnpGjTmEXAMPLEtoken".into()),
            Answer::Confirm(false),                  // no online check
            Answer::Text("42, 99".into()),           // allowlist
            Answer::Select(1),                       // dm policy: allowlist
            Answer::Confirm(false),                  // discord
            Answer::Confirm(false),                  // slack
            Answer::Confirm(false),                  // whatsapp
        ]);

        let config = setup_channels(ConfigDocument::default(), WizardFlow::Advanced, &prompter)
            .await
            .unwrap();

        let tg = config.channels.unwrap().telegram.unwrap();
        assert_eq!(
            tg.allow_from,
            Some(vec!["42".to_string(), "99".to_string()])
        );
        assert_eq!(tg.dm_policy.as_deref(), Some("allowlist"));
    }

    #[tokio::test]
    async fn declining_an_enabled_channel_disables_it() {
        let mut base = ConfigDocument::default();
        base.channels = Some(ChannelsSection {
            telegram: Some(ChannelEntry {
                enabled: Some(true),
                token: Some("123456:AAkq-zXciXcqnpGjTmEXAMPLEtoken".into()),
                allow_from: None,
                dm_policy: None,
            }),
            ..Default::default()
        });

        let prompter = ScriptedPrompter::new([
            Answer::Confirm(false), // telegram off
            Answer::Confirm(false), // discord stays off
        ]);
        let config = setup_channels(base, WizardFlow::Quickstart, &prompter)
            .await
            .unwrap();

        let tg = config.channels.unwrap().telegram.unwrap();
        assert_eq!(tg.enabled, Some(false));
        // token kept for a later re-enable
        assert!(tg.token.is_some());
    }
}
