//! Interactive prompting
//!
//! All user input goes through the [`Prompter`] trait so the selection logic
//! can run against scripted answers. Invalid input is re-asked; only a closed
//! input stream ends a prompt loop.

use crate::PromptError;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Source of interactive answers
pub trait Prompter: Send {
    /// Shows `prompt` and reads one line of input, without the line ending
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError>;

    /// Shows one informational line to the user
    fn show(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Reads answers from standard input
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = off_runtime(|| std::io::stdin().lock().read_line(&mut line))?;
        if read == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

/// Runs a blocking call without stalling other tasks on a multi-threaded runtime
fn off_runtime<T>(f: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};

    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// Answers prompts from a fixed queue; reports `Closed` once it runs dry
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            shown: Vec::new(),
        }
    }

    /// Prompts asked so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Informational lines shown so far
    pub fn shown(&self) -> &[String] {
        &self.shown
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(PromptError::Closed)
    }

    fn show(&mut self, line: &str) {
        self.shown.push(line.to_string());
    }
}

/// Asks for a number in `min..=max`, re-asking on anything else
pub fn prompt_in_range(
    prompter: &mut dyn Prompter,
    prompt: &str,
    min: usize,
    max: usize,
) -> Result<usize, PromptError> {
    loop {
        let answer = prompter.read_line(prompt)?;
        match answer.trim().parse::<usize>() {
            Ok(n) if n >= min && n <= max => return Ok(n),
            _ => prompter.show("Invalid selection."),
        }
    }
}

/// Asks for a 1-based index into a list of `len` items, returning it 0-based
pub fn prompt_index(
    prompter: &mut dyn Prompter,
    prompt: &str,
    len: usize,
) -> Result<usize, PromptError> {
    prompt_in_range(prompter, prompt, 1, len).map(|n| n - 1)
}

/// Like [`prompt_index`] but `0` means "skip"
pub fn prompt_index_or_skip(
    prompter: &mut dyn Prompter,
    prompt: &str,
    len: usize,
) -> Result<Option<usize>, PromptError> {
    prompt_in_range(prompter, prompt, 0, len).map(|n| n.checked_sub(1))
}
