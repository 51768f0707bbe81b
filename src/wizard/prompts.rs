//! Prompt abstraction for the setup wizard.
//!
//! Every question the wizard asks goes through the `Prompter` trait so
//! the orchestrator can be driven by a terminal (`InteractivePrompter`),
//! by defaults only (`NonInteractivePrompter`), or by a scripted answer
//! queue in tests.

use console::style;
use dialoguer::{Confirm, Input, Select};

use crate::error::WizardError;

/// Answers wizard questions. Implementations are synchronous; the
/// orchestrator treats each call as a suspension point.
pub trait Prompter: Send + Sync {
    /// Opening banner for a wizard section.
    fn intro(&self, title: &str);

    /// One-way informational message.
    fn note(&self, message: &str);

    /// Closing message.
    fn outro(&self, message: &str);

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, WizardError>;

    /// Free-text input. `default` pre-fills the answer when present.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, WizardError>;

    /// Pick one of `items`, returning its index.
    fn select(&self, prompt: &str, items: &[&str], default: usize) -> Result<usize, WizardError>;
}

/// Terminal prompter built on dialoguer.
pub struct InteractivePrompter;

impl InteractivePrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InteractivePrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn map_prompt_err(e: dialoguer::Error) -> WizardError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            WizardError::Cancelled
        }
        other => WizardError::Prompt(other.to_string()),
    }
}

impl Prompter for InteractivePrompter {
    fn intro(&self, title: &str) {
        println!();
        println!("{}", style(title).cyan().bold());
        println!();
    }

    fn note(&self, message: &str) {
        for line in message.lines() {
            println!("  {}", style(line).dim());
        }
    }

    fn outro(&self, message: &str) {
        println!();
        println!("{}", style(message).green());
        println!();
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, WizardError> {
        Confirm::new()
            .with_prompt(format!("  {prompt}"))
            .default(default)
            .interact()
            .map_err(map_prompt_err)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, WizardError> {
        let result = match default {
            Some(default) => Input::<String>::new()
                .with_prompt(format!("  {prompt}"))
                .default(default.to_string())
                .interact_text(),
            None => Input::<String>::new()
                .with_prompt(format!("  {prompt}"))
                .allow_empty(true)
                .interact_text(),
        };
        result.map_err(map_prompt_err)
    }

    fn select(&self, prompt: &str, items: &[&str], default: usize) -> Result<usize, WizardError> {
        Select::new()
            .with_prompt(format!("  {prompt}"))
            .items(items)
            .default(default)
            .interact()
            .map_err(map_prompt_err)
    }
}

/// Prompter that answers every question with its default. Free-text
/// questions without a default are an error rather than a silent guess.
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn intro(&self, title: &str) {
        println!("{title}");
    }

    fn note(&self, message: &str) {
        println!("{message}");
    }

    fn outro(&self, message: &str) {
        println!("{message}");
    }

    fn confirm(&self, _prompt: &str, default: bool) -> Result<bool, WizardError> {
        Ok(default)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, WizardError> {
        match default {
            Some(d) => Ok(d.to_string()),
            None => Err(WizardError::Prompt(format!(
                "'{prompt}' requires input; rerun without --non-interactive"
            ))),
        }
    }

    fn select(&self, _prompt: &str, _items: &[&str], default: usize) -> Result<usize, WizardError> {
        Ok(default)
    }
}

#[cfg(test)]
pub use scripted::{Answer, ScriptedPrompter};

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{Prompter, WizardError};

    /// One scripted answer, consumed in order.
    #[derive(Debug, Clone)]
    pub enum Answer {
        Confirm(bool),
        Text(String),
        Select(usize),
        /// Cancel at this prompt, whatever kind it is.
        Cancel,
    }

    /// Replays a fixed answer queue and records everything shown.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: Mutex<VecDeque<Answer>>,
        shown: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                shown: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, prompt: &str) -> Result<Answer, WizardError> {
            self.shown.lock().unwrap().push(prompt.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| WizardError::Prompt(format!("no scripted answer for '{prompt}'")))
        }

        /// Everything shown so far (prompts, notes, intros, outros).
        pub fn transcript(&self) -> Vec<String> {
            self.shown.lock().unwrap().clone()
        }

        pub fn answers_exhausted(&self) -> bool {
            self.answers.lock().unwrap().is_empty()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn intro(&self, title: &str) {
            self.shown.lock().unwrap().push(title.to_string());
        }

        fn note(&self, message: &str) {
            self.shown.lock().unwrap().push(message.to_string());
        }

        fn outro(&self, message: &str) {
            self.shown.lock().unwrap().push(message.to_string());
        }

        fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, WizardError> {
            match self.next(prompt)? {
                Answer::Confirm(v) => Ok(v),
                Answer::Cancel => Err(WizardError::Cancelled),
                other => Err(WizardError::Prompt(format!(
                    "expected Confirm answer for '{prompt}', got {other:?}"
                ))),
            }
        }

        fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, WizardError> {
            match self.next(prompt)? {
                Answer::Text(v) if v.is_empty() => {
                    Ok(default.unwrap_or_default().to_string())
                }
                Answer::Text(v) => Ok(v),
                Answer::Cancel => Err(WizardError::Cancelled),
                other => Err(WizardError::Prompt(format!(
                    "expected Text answer for '{prompt}', got {other:?}"
                ))),
            }
        }

        fn select(&self, prompt: &str, items: &[&str], _default: usize) -> Result<usize, WizardError> {
            match self.next(prompt)? {
                Answer::Select(i) if i < items.len() => Ok(i),
                Answer::Select(i) => Err(WizardError::Prompt(format!(
                    "scripted index {i} out of range for '{prompt}'"
                ))),
                Answer::Cancel => Err(WizardError::Cancelled),
                other => Err(WizardError::Prompt(format!(
                    "expected Select answer for '{prompt}', got {other:?}"
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_uses_defaults() {
        let p = NonInteractivePrompter;
        assert!(p.confirm("continue?", true).unwrap());
        assert_eq!(p.text("workspace", Some("~/ws")).unwrap(), "~/ws");
        assert_eq!(p.select("pick", &["a", "b"], 1).unwrap(), 1);
    }

    #[test]
    fn non_interactive_rejects_required_text() {
        let p = NonInteractivePrompter;
        let err = p.text("remote url", None).unwrap_err();
        assert!(matches!(err, WizardError::Prompt(_)));
    }

    #[test]
    fn scripted_replays_in_order() {
        let p = ScriptedPrompter::new([
            Answer::Confirm(false),
            Answer::Select(2),
            Answer::Text("hello".into()),
        ]);
        assert!(!p.confirm("risk?", true).unwrap());
        assert_eq!(p.select("flow", &["a", "b", "c"], 0).unwrap(), 2);
        assert_eq!(p.text("name", None).unwrap(), "hello");
        assert!(p.answers_exhausted());
    }

    #[test]
    fn scripted_cancel_maps_to_cancelled() {
        let p = ScriptedPrompter::new([Answer::Cancel]);
        let err = p.confirm("risk?", true).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn scripted_kind_mismatch_is_prompt_error() {
        let p = ScriptedPrompter::new([Answer::Text("x".into())]);
        let err = p.confirm("risk?", true).unwrap_err();
        assert!(matches!(err, WizardError::Prompt(_)));
    }
}
