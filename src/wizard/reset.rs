//! Reset handler.
//!
//! Clears on-disk state before a fresh setup. Scopes are inclusive
//! supersets; missing paths are a no-op.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::GatePaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Configuration document only.
    Config,
    /// Configuration, credential store, and session history.
    ConfigCredsSessions,
    /// Everything, including workspace artifacts.
    Full,
}

impl ResetScope {
    pub const ALL: [ResetScope; 3] = [
        ResetScope::Config,
        ResetScope::ConfigCredsSessions,
        ResetScope::Full,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Config => "Config only",
            Self::ConfigCredsSessions => "Config, credentials, and session history",
            Self::Full => "Everything, including workspace artifacts",
        }
    }
}

/// Remove the on-disk state covered by `scope`.
pub fn handle_reset(scope: ResetScope, workspace: &Path, paths: &GatePaths) -> Result<()> {
    remove_file(&paths.config_path())?;
    for i in 1..=5 {
        remove_file(&paths.home().join(format!("config.toml.backup{i}")))?;
    }

    if matches!(scope, ResetScope::ConfigCredsSessions | ResetScope::Full) {
        remove_file(&paths.keys_path())?;
        remove_dir(&paths.sessions_dir())?;
    }

    if scope == ResetScope::Full {
        remove_dir(workspace)?;
    }

    Ok(())
}

fn remove_file(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
        tracing::info!("removed {}", path.display());
    }
    Ok(())
}

fn remove_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        tracing::info!("removed {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_home() -> (TempDir, GatePaths) {
        let dir = TempDir::new().unwrap();
        let paths = GatePaths::from_home(dir.path());
        fs::create_dir_all(paths.sessions_dir()).unwrap();
        fs::create_dir_all(paths.default_workspace()).unwrap();
        fs::write(paths.config_path(), "language = \"en\"\n").unwrap();
        fs::write(paths.home().join("config.toml.backup1"), "old").unwrap();
        fs::write(paths.keys_path(), "").unwrap();
        fs::write(paths.sessions_dir().join("s1.jsonl"), "{}").unwrap();
        fs::write(paths.default_workspace().join("notes.md"), "hi").unwrap();
        (dir, paths)
    }

    #[test]
    fn config_scope_leaves_creds_and_sessions() {
        let (_dir, paths) = seeded_home();
        let ws = paths.default_workspace();
        handle_reset(ResetScope::Config, &ws, &paths).unwrap();

        assert!(!paths.config_path().exists());
        assert!(!paths.home().join("config.toml.backup1").exists());
        assert!(paths.keys_path().exists());
        assert!(paths.sessions_dir().exists());
        assert!(ws.exists());

        let snap = crate::config::load_snapshot(&paths);
        assert!(!snap.exists);
    }

    #[test]
    fn creds_scope_clears_keys_and_sessions() {
        let (_dir, paths) = seeded_home();
        let ws = paths.default_workspace();
        handle_reset(ResetScope::ConfigCredsSessions, &ws, &paths).unwrap();

        assert!(!paths.config_path().exists());
        assert!(!paths.keys_path().exists());
        assert!(!paths.sessions_dir().exists());
        assert!(ws.exists());
    }

    #[test]
    fn full_scope_clears_workspace_too() {
        let (_dir, paths) = seeded_home();
        let ws = paths.default_workspace();
        handle_reset(ResetScope::Full, &ws, &paths).unwrap();

        assert!(!paths.config_path().exists());
        assert!(!paths.keys_path().exists());
        assert!(!paths.sessions_dir().exists());
        assert!(!ws.exists());
    }

    #[test]
    fn missing_paths_are_a_noop() {
        let dir = TempDir::new().unwrap();
        let paths = GatePaths::from_home(dir.path().join("never-created"));
        let ws = paths.default_workspace();
        handle_reset(ResetScope::Full, &ws, &paths).unwrap();
    }
}
