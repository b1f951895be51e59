//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::Result;

pub mod formatter;

pub use formatter::{
    display_dry_run, display_error, display_release_warning, display_status,
    display_status_report, display_success, StatusReport,
};

/// Source of operator answers for the release prompts
pub trait Prompter {
    /// Show `prompt` and read one line.
    ///
    /// # Returns
    /// * `Ok(Some(line))` - The trimmed answer (possibly empty)
    /// * `Ok(None)` - Input is exhausted; the operator cancelled
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask a yes/no question; anything other than a truthy answer is "no".
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [Y/N]: ", prompt))?;
        Ok(answer.as_deref().is_some_and(is_truthy))
    }
}

/// Interprets a yes/no answer: `y`, `yes`, `t`, `true`, `on` and `1` are yes.
pub fn is_truthy(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "t" | "true" | "on" | "1"
    )
}

/// Prompts on stdout and reads answers from stdin
pub struct ConsolePrompter<R = io::StdinLock<'static>> {
    input: R,
}

impl ConsolePrompter {
    pub fn stdin() -> Self {
        ConsolePrompter {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> ConsolePrompter<R> {
    pub fn from_reader(input: R) -> Self {
        ConsolePrompter { input }
    }
}

impl<R: BufRead> Prompter for ConsolePrompter<R> {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            println!();
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Replays canned answers; used by tests and non-interactive callers
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every prompt shown, in order
    pub prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
