//! Process-wide locale state.
//!
//! The wizard resolves the locale once (explicit option > persisted
//! `language` > default) and applies it before any further text is shown.
//! Localized string tables live outside this crate; we only track the
//! selected tag so it can be stamped into the configuration document.

use std::sync::RwLock;

use once_cell::sync::Lazy;

pub const DEFAULT_LOCALE: &str = "en";

/// Locale tags the wizard offers. Anything else round-trips untouched
/// from an existing config but is not offered interactively.
pub const SUPPORTED_LOCALES: &[(&str, &str)] = &[("en", "English"), ("zh-CN", "简体中文")];

static CURRENT: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(DEFAULT_LOCALE.to_string()));

/// Currently applied locale tag.
pub fn current_locale() -> String {
    CURRENT
        .read()
        .map(|s| s.clone())
        .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
}

/// Apply a locale process-wide.
pub fn set_locale(tag: &str) {
    if let Ok(mut cur) = CURRENT.write() {
        *cur = tag.to_string();
    }
    tracing::debug!("locale set to {tag}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
        set_locale(DEFAULT_LOCALE);
        assert_eq!(current_locale(), DEFAULT_LOCALE);
    }
}
