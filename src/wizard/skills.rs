//! Skill setup sub-flow.
//!
//! Skills are named capabilities the agent can load at runtime; the
//! wizard only records which ones are wanted. The entry list is kept
//! sorted so repeated runs produce identical documents.

use std::path::Path;

use crate::config::ConfigDocument;
use crate::error::WizardError;

use super::prompts::Prompter;

/// Built-in skill catalog offered during setup.
pub const SKILL_CATALOG: [(&str, &str); 3] = [
    ("notes", "Persistent note taking in the workspace"),
    ("web-search", "Search the web and summarize results"),
    ("reminders", "Scheduled one-shot and recurring reminders"),
];

/// Walk the catalog and record the wanted skills.
pub fn setup_skills(
    config: ConfigDocument,
    workspace: &Path,
    prompter: &dyn Prompter,
) -> Result<ConfigDocument, WizardError> {
    let current: Vec<String> = config
        .skills
        .as_ref()
        .and_then(|s| s.entries.clone())
        .unwrap_or_default();

    prompter.note(&format!(
        "Skills store their data under {}",
        workspace.display()
    ));

    let mut entries = Vec::new();
    for (name, description) in SKILL_CATALOG {
        let wanted = prompter.confirm(
            &format!("Enable the {name} skill? ({description})"),
            current.iter().any(|e| e == name),
        )?;
        if wanted {
            entries.push(name.to_string());
        }
    }

    // unknown entries from a hand-edited config survive
    for entry in current {
        if !SKILL_CATALOG.iter().any(|(name, _)| *name == entry) && !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    entries.sort();

    let mut config = config;
    config.skills.get_or_insert_with(Default::default).entries = Some(entries);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::prompts::{Answer, ScriptedPrompter};
    use std::path::PathBuf;

    #[test]
    fn selection_is_recorded_sorted() {
        let prompter = ScriptedPrompter::new([
            Answer::Confirm(false), // notes
            Answer::Confirm(true),  // web-search
            Answer::Confirm(true),  // reminders
        ]);
        let config = setup_skills(
            ConfigDocument::default(),
            &PathBuf::from("/tmp/ws"),
            &prompter,
        )
        .unwrap();

        assert_eq!(
            config.skills.unwrap().entries.unwrap(),
            vec!["reminders".to_string(), "web-search".to_string()]
        );
    }

    #[test]
    fn hand_edited_entries_survive() {
        let mut base = ConfigDocument::default();
        base.skills = Some(crate::config::SkillsSection {
            entries: Some(vec!["homegrown".to_string(), "notes".to_string()]),
        });

        // keep notes, decline the rest
        let prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Confirm(false),
            Answer::Confirm(false),
        ]);
        let config = setup_skills(base, &PathBuf::from("/tmp/ws"), &prompter).unwrap();

        assert_eq!(
            config.skills.unwrap().entries.unwrap(),
            vec!["homegrown".to_string(), "notes".to_string()]
        );
    }
}
