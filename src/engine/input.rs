use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use log::error;

/// Where command lines and nested prompt answers come from.
///
/// Handlers that need more input (password locks) call `read_line` directly. The answer is
/// consumed there and never dispatched as a command.
pub trait InputSource {
    /// Shows `prompt` and blocks for one line without its line terminator.
    /// `None` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Interactive terminal input.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        if let Err(e) = io::stdout().flush() {
            error!("failed to flush stdout: {e}");
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                error!("failed to read from stdin: {e}");
                None
            }
        }
    }
}

/// Pre-recorded lines, used by tests and the browser binding.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedInput {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front()
    }
}
