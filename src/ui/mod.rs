//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - The [Prompter] seam and its implementations

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use dialoguer::console::{strip_ansi_codes, style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::{BumpError, Result};

pub mod formatter;

pub use formatter::{
    display_commits, display_error, display_progress, display_status, display_success,
    display_summary, display_warning,
};

/// Asks the user questions
///
/// `Ok(None)` from [`Prompter::select`] or [`Prompter::input`] means the user
/// cancelled the prompt (Esc or Ctrl-C).
pub trait Prompter {
    /// Choose one of `items`, starting on `default`
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>>;

    /// Free text, pre-filled with `default` when given
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Yes or no; a cancelled prompt answers no
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

pub fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_style: Style::new().for_stderr().bold(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        values_style: Style::new().for_stderr().cyan(),
        ..ColorfulTheme::default()
    }
}

fn prompt_io_error(error: dialoguer::Error) -> BumpError {
    match error {
        dialoguer::Error::IO(err) if err.kind() == io::ErrorKind::Interrupted => {
            BumpError::Cancelled
        }
        dialoguer::Error::IO(err) => BumpError::Io(err),
    }
}

/// Prompts on the terminal with dialoguer
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        Select::with_theme(&prompt_theme())
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .map_err(prompt_io_error)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let theme = prompt_theme();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }

        match input.interact_text() {
            Ok(answer) => Ok(Some(answer)),
            Err(e) => match prompt_io_error(e) {
                BumpError::Cancelled => Ok(None),
                other => Err(other),
            },
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&prompt_theme())
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map(|answer| answer.unwrap_or(false))
            .map_err(prompt_io_error)
    }
}

/// One queued answer for a [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the item with this label
    Select(String),
    /// Pick whatever the prompt has as default
    Default,
    Input(String),
    Confirm(bool),
    Cancel,
}

/// Answers prompts from a queue, for non-interactive runs and tests
///
/// Every prompt pops the next answer; an empty queue takes the default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompter {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn next(&self, prompt: &str) -> Answer {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(Answer::Default)
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        match self.next(prompt) {
            Answer::Select(label) => items
                .iter()
                .position(|item| strip_ansi_codes(item).trim_start().starts_with(&label))
                .map(Some)
                .ok_or_else(|| BumpError::invalid_argument(format!("no choice named {}", label))),
            Answer::Cancel => Ok(None),
            _ => Ok(Some(default)),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        match self.next(prompt) {
            Answer::Input(text) => Ok(Some(text)),
            Answer::Cancel => Ok(None),
            _ => Ok(Some(default.unwrap_or_default().to_string())),
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt) {
            Answer::Confirm(yes) => Ok(yes),
            Answer::Cancel => Ok(false),
            _ => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        vec!["major 2.0.0".into(), "minor 1.1.0".into(), "patch 1.0.1".into()]
    }

    #[test]
    fn test_scripted_select_by_label() {
        let prompter = ScriptedPrompter::new([Answer::Select("patch".into()), Answer::Default]);
        assert_eq!(prompter.select("pick", &items(), 0).unwrap(), Some(2));
        assert_eq!(prompter.select("pick", &items(), 1).unwrap(), Some(1));
        assert_eq!(prompter.asked(), vec!["pick", "pick"]);
    }

    #[test]
    fn test_scripted_cancel() {
        let prompter = ScriptedPrompter::new([Answer::Cancel, Answer::Cancel, Answer::Cancel]);
        assert_eq!(prompter.select("pick", &items(), 0).unwrap(), None);
        assert_eq!(prompter.input("text", Some("x")).unwrap(), None);
        assert!(!prompter.confirm("ok?", true).unwrap());
    }

    #[test]
    fn test_scripted_empty_queue_takes_defaults() {
        let prompter = ScriptedPrompter::default();
        assert_eq!(prompter.input("tag", Some("beta")).unwrap(), Some("beta".into()));
        assert!(prompter.confirm("ok?", true).unwrap());
    }

    #[test]
    fn test_unknown_choice_is_error() {
        let prompter = ScriptedPrompter::new([Answer::Select("nope".into())]);
        assert!(prompter.select("pick", &items(), 0).is_err());
    }
}
