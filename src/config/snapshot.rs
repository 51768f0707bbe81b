//! Snapshot loader, structural validation, and the atomic config writer.
//!
//! The snapshot is produced once per wizard run and is immutable after
//! load. Loading never panics and never errors: unreadable or malformed
//! state is reported through `valid = false` plus a structured issue
//! list, and the orchestrator decides what to do about it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use super::types::{ConfigDocument, GatePaths};

/// A structural problem found in the persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigIssue {
    /// Dotted path of the offending field ("gateway.port")
    pub path: String,
    pub message: String,
}

/// The as-loaded, validated-or-not state of the persisted configuration.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub exists: bool,
    pub valid: bool,
    pub config: ConfigDocument,
    pub issues: Vec<ConfigIssue>,
}

impl ConfigSnapshot {
    fn missing() -> Self {
        Self {
            exists: false,
            valid: true,
            config: ConfigDocument::default(),
            issues: Vec::new(),
        }
    }

    fn invalid(issues: Vec<ConfigIssue>) -> Self {
        Self {
            exists: true,
            valid: false,
            config: ConfigDocument::default(),
            issues,
        }
    }
}

/// Read and validate the persisted configuration.
pub fn load_snapshot(paths: &GatePaths) -> ConfigSnapshot {
    let path = paths.config_path();
    if !path.exists() {
        return ConfigSnapshot::missing();
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            return ConfigSnapshot::invalid(vec![ConfigIssue {
                path: String::new(),
                message: format!("failed to read {}: {e}", path.display()),
            }]);
        }
    };

    let value: toml::Value = match toml::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            return ConfigSnapshot::invalid(vec![ConfigIssue {
                path: String::new(),
                message: format!("not valid TOML: {e}"),
            }]);
        }
    };

    let issues = validate_document(&value);
    if !issues.is_empty() {
        return ConfigSnapshot::invalid(issues);
    }

    match value.try_into::<ConfigDocument>() {
        Ok(config) => ConfigSnapshot {
            exists: true,
            valid: true,
            config,
            issues: Vec::new(),
        },
        Err(e) => ConfigSnapshot::invalid(vec![ConfigIssue {
            path: String::new(),
            message: format!("failed to decode document: {e}"),
        }]),
    }
}

/// Structural validation of the raw TOML tree. Returns one issue per
/// problem so the wizard can list all of them at once.
pub fn validate_document(value: &toml::Value) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let Some(root) = value.as_table() else {
        issues.push(ConfigIssue {
            path: String::new(),
            message: "document root must be a table".to_string(),
        });
        return issues;
    };

    const KNOWN_ROOTS: &[&str] = &[
        "language", "agents", "gateway", "provider", "channels", "skills", "hooks", "wizard",
    ];
    for key in root.keys() {
        if !KNOWN_ROOTS.contains(&key.as_str()) {
            issues.push(ConfigIssue {
                path: key.clone(),
                message: "unknown top-level key".to_string(),
            });
        }
    }

    if let Some(lang) = root.get("language") {
        if !lang.is_str() {
            issues.push(issue("language", "must be a string"));
        }
    }

    if let Some(agents) = root.get("agents") {
        match agents.as_table() {
            None => issues.push(issue("agents", "must be a table")),
            Some(t) => {
                if let Some(defaults) = t.get("defaults") {
                    match defaults.as_table() {
                        None => issues.push(issue("agents.defaults", "must be a table")),
                        Some(d) => {
                            check_str(d, "workspace", "agents.defaults.workspace", &mut issues);
                            check_bool(
                                d,
                                "skip_bootstrap",
                                "agents.defaults.skip_bootstrap",
                                &mut issues,
                            );
                        }
                    }
                }
            }
        }
    }

    if let Some(gateway) = root.get("gateway") {
        match gateway.as_table() {
            None => issues.push(issue("gateway", "must be a table")),
            Some(g) => validate_gateway(g, &mut issues),
        }
    }

    if let Some(provider) = root.get("provider") {
        match provider.as_table() {
            None => issues.push(issue("provider", "must be a table")),
            Some(p) => {
                check_str(p, "id", "provider.id", &mut issues);
                check_str(p, "base_url", "provider.base_url", &mut issues);
                check_str(p, "api_key", "provider.api_key", &mut issues);
                check_str(p, "default_model", "provider.default_model", &mut issues);
            }
        }
    }

    if let Some(channels) = root.get("channels") {
        match channels.as_table() {
            None => issues.push(issue("channels", "must be a table")),
            Some(c) => {
                for (name, entry) in c {
                    let base = format!("channels.{name}");
                    match entry.as_table() {
                        None => issues.push(issue(&base, "must be a table")),
                        Some(e) => {
                            check_bool(e, "enabled", &format!("{base}.enabled"), &mut issues);
                            check_str(e, "token", &format!("{base}.token"), &mut issues);
                            check_str(e, "dm_policy", &format!("{base}.dm_policy"), &mut issues);
                            if let Some(v) = e.get("allow_from") {
                                if !v.is_array() {
                                    issues.push(issue(
                                        &format!("{base}.allow_from"),
                                        "must be an array",
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    for section in ["skills", "hooks", "wizard"] {
        if let Some(v) = root.get(section) {
            if !v.is_table() {
                issues.push(issue(section, "must be a table"));
            }
        }
    }

    issues
}

fn validate_gateway(g: &toml::map::Map<String, toml::Value>, issues: &mut Vec<ConfigIssue>) {
    if let Some(port) = g.get("port") {
        match port.as_integer() {
            Some(p) if (1..=65535).contains(&p) => {}
            Some(p) => issues.push(issue("gateway.port", &format!("{p} is out of range"))),
            None => issues.push(issue("gateway.port", "must be an integer")),
        }
    }
    check_str(g, "bind", "gateway.bind", issues);
    check_str(g, "custom_bind_host", "gateway.custom_bind_host", issues);
    check_str(g, "mode", "gateway.mode", issues);

    if let Some(auth) = g.get("auth") {
        match auth.as_table() {
            None => issues.push(issue("gateway.auth", "must be a table")),
            Some(a) => {
                check_str(a, "mode", "gateway.auth.mode", issues);
                check_str(a, "token", "gateway.auth.token", issues);
                check_str(a, "password", "gateway.auth.password", issues);
            }
        }
    }

    if let Some(ts) = g.get("tailscale") {
        match ts.as_table() {
            None => issues.push(issue("gateway.tailscale", "must be a table")),
            Some(t) => {
                check_str(t, "mode", "gateway.tailscale.mode", issues);
                check_bool(t, "reset_on_exit", "gateway.tailscale.reset_on_exit", issues);
            }
        }
    }

    if let Some(remote) = g.get("remote") {
        match remote.as_table() {
            None => issues.push(issue("gateway.remote", "must be a table")),
            Some(r) => {
                check_str(r, "url", "gateway.remote.url", issues);
                check_str(r, "token", "gateway.remote.token", issues);
            }
        }
    }
}

fn issue(path: &str, message: &str) -> ConfigIssue {
    ConfigIssue {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn check_str(t: &toml::map::Map<String, toml::Value>, key: &str, path: &str, issues: &mut Vec<ConfigIssue>) {
    if let Some(v) = t.get(key) {
        if !v.is_str() {
            issues.push(issue(path, "must be a string"));
        }
    }
}

fn check_bool(t: &toml::map::Map<String, toml::Value>, key: &str, path: &str, issues: &mut Vec<ConfigIssue>) {
    if let Some(v) = t.get(key) {
        if !v.is_bool() {
            issues.push(issue(path, "must be a boolean"));
        }
    }
}

/// Persist the full document with atomic replace-on-write.
///
/// Each write is a complete document, last write wins. The temp file
/// lands next to the target so the rename stays on one filesystem.
pub fn write_config(paths: &GatePaths, config: &ConfigDocument) -> Result<()> {
    let path = paths.config_path();
    let toml_string =
        toml::to_string_pretty(config).context("failed to serialize config to TOML")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
    }

    backup_config(&path, 5);

    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, &toml_string)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    tracing::info!("configuration saved to {}", path.display());
    Ok(())
}

/// Rotate config backups before writing.
///
/// Keeps up to `max_backups` copies named `config.toml.backup1` (newest)
/// through `config.toml.backupN` (oldest). Silently ignores errors —
/// backup failure must never block a config write.
fn backup_config(path: &std::path::Path, max_backups: usize) {
    if !path.exists() {
        return;
    }
    let parent = match path.parent() {
        Some(p) => p,
        None => return,
    };
    let stem = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    for i in (1..=max_backups).rev() {
        let src = parent.join(format!("{stem}.backup{i}"));
        if i == max_backups {
            let _ = fs::remove_file(&src);
        } else {
            let dst = parent.join(format!("{stem}.backup{}", i + 1));
            if src.exists() {
                let _ = fs::rename(&src, &dst);
            }
        }
    }

    let backup1 = parent.join(format!("{stem}.backup1"));
    if let Err(e) = fs::copy(path, &backup1) {
        tracing::warn!("failed to back up config before write: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths() -> (TempDir, GatePaths) {
        let dir = TempDir::new().unwrap();
        let paths = GatePaths::from_home(dir.path());
        (dir, paths)
    }

    #[test]
    fn missing_file_is_exists_false_valid_true() {
        let (_dir, paths) = paths();
        let snap = load_snapshot(&paths);
        assert!(!snap.exists);
        assert!(snap.valid);
        assert!(snap.issues.is_empty());
    }

    #[test]
    fn malformed_toml_is_invalid_with_issue() {
        let (_dir, paths) = paths();
        fs::create_dir_all(paths.home()).unwrap();
        fs::write(paths.config_path(), "not = [valid").unwrap();
        let snap = load_snapshot(&paths);
        assert!(snap.exists);
        assert!(!snap.valid);
        assert_eq!(snap.issues.len(), 1);
        assert!(snap.issues[0].message.contains("TOML"));
    }

    #[test]
    fn wrong_types_produce_pathed_issues() {
        let (_dir, paths) = paths();
        fs::create_dir_all(paths.home()).unwrap();
        fs::write(
            paths.config_path(),
            "language = 7\n[gateway]\nport = 99999\nbind = true\n",
        )
        .unwrap();
        let snap = load_snapshot(&paths);
        assert!(!snap.valid);
        let issue_paths: Vec<&str> = snap.issues.iter().map(|i| i.path.as_str()).collect();
        assert!(issue_paths.contains(&"language"));
        assert!(issue_paths.contains(&"gateway.port"));
        assert!(issue_paths.contains(&"gateway.bind"));
    }

    #[test]
    fn unknown_top_level_key_is_flagged() {
        let (_dir, paths) = paths();
        fs::create_dir_all(paths.home()).unwrap();
        fs::write(paths.config_path(), "mystery = 1\n").unwrap();
        let snap = load_snapshot(&paths);
        assert!(!snap.valid);
        assert_eq!(snap.issues[0].path, "mystery");
    }

    #[test]
    fn valid_file_loads_document() {
        let (_dir, paths) = paths();
        fs::create_dir_all(paths.home()).unwrap();
        fs::write(
            paths.config_path(),
            "language = \"en\"\n[gateway]\nport = 18789\nbind = \"lan\"\n",
        )
        .unwrap();
        let snap = load_snapshot(&paths);
        assert!(snap.exists);
        assert!(snap.valid);
        assert_eq!(snap.config.gateway_port(), 18789);
        assert_eq!(
            snap.config.gateway.as_ref().unwrap().bind.as_deref(),
            Some("lan")
        );
    }

    #[test]
    fn write_then_load_round_trips() {
        let (_dir, paths) = paths();
        let doc = ConfigDocument::default()
            .with_language("en")
            .with_gateway_network(18789, "loopback", None)
            .with_gateway_mode("local");
        write_config(&paths, &doc).unwrap();

        let snap = load_snapshot(&paths);
        assert!(snap.exists && snap.valid);
        assert_eq!(snap.config, doc);
        // no temp file left behind
        assert!(!paths.config_path().with_extension("toml.tmp").exists());
    }

    #[test]
    fn rewrite_is_complete_document_last_write_wins() {
        let (_dir, paths) = paths();
        let first = ConfigDocument::default().with_gateway_network(1111, "lan", None);
        write_config(&paths, &first).unwrap();
        let second = ConfigDocument::default().with_gateway_network(2222, "loopback", None);
        write_config(&paths, &second).unwrap();

        let snap = load_snapshot(&paths);
        assert_eq!(snap.config.gateway_port(), 2222);
        assert_eq!(
            snap.config.gateway.as_ref().unwrap().bind.as_deref(),
            Some("loopback")
        );
        // previous content rotated to backup1
        assert!(paths.home().join("config.toml.backup1").exists());
    }
}
