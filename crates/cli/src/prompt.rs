use std::io::{stdin, stdout, Write};

use api_explorer_core::error::{Error, Result};
use api_explorer_core::interaction::{is_yes, Prompter};

/// Asks questions on the terminal and reads one line per answer.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{question}");
        stdout().flush().map_err(Error::Stdio)?;

        let mut input = String::new();
        stdin().read_line(&mut input).map_err(Error::Stdio)?;

        Ok(is_yes(&input))
    }
}
