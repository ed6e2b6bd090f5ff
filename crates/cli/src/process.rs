//! Pager and editor subprocesses.

use std::fs;
use std::io::{self, stdout, Write};
use std::process::{Command, Stdio};

use log::{debug, info};

use api_explorer_core::error::{Error, Result};
use api_explorer_core::interaction::{Editor, Pager};

/// Editor used when neither `--editor` nor `EDITOR` is set
pub const DEFAULT_EDITOR: &str = "vi";

/// Splits a command line such as `less -R` into the program and its arguments.
///
/// # Errors
///
/// Returns an error if the command line is blank.
pub fn command_from(command_line: &str) -> Result<Command> {
    let mut words = command_line.split_whitespace();
    let program = words.next().ok_or_else(|| {
        Error::SubProcess(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty command line",
        ))
    })?;

    let mut command = Command::new(program);
    command.args(words);
    Ok(command)
}

/// Waits for `command` with the terminal handed over to it.
///
/// # Errors
///
/// Returns an error if the command can't be started or exits unsuccessfully.
fn run_interactive(mut command: Command) -> Result<()> {
    let subprocess_exit_success = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()?
        .wait()?
        .success();

    if subprocess_exit_success {
        Ok(())
    } else {
        Err(Error::SubProcessExit)
    }
}

/// Shows documents through the configured pager, or prints them.
pub struct CommandPager {
    command_line: Option<String>,
}

impl CommandPager {
    pub fn new(command_line: Option<String>) -> Self {
        Self {
            command_line: command_line.filter(|line| !line.trim().is_empty()),
        }
    }
}

impl Pager for CommandPager {
    fn page(&mut self, document: &[u8]) -> Result<()> {
        let Some(command_line) = &self.command_line else {
            let mut stdout = stdout();
            stdout.write_all(document).map_err(Error::Stdio)?;
            return writeln!(stdout).map_err(Error::Stdio);
        };

        info!("Paging through `{command_line}`");
        let mut child = command_from(command_line)?
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(document) {
                // The operator quit the pager before reading everything
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("Pager closed its input early");
                }
                result => result?,
            }
        }

        if child.wait()?.success() {
            Ok(())
        } else {
            Err(Error::SubProcessExit)
        }
    }
}

/// Edits documents in a temporary `.json` file with the configured editor.
pub struct CommandEditor {
    command_line: String,
}

impl CommandEditor {
    pub fn new(command_line: Option<String>) -> Self {
        Self {
            command_line: command_line
                .filter(|line| !line.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
        }
    }
}

impl Editor for CommandEditor {
    fn edit(&mut self, document: &[u8]) -> Result<Vec<u8>> {
        let mut file = tempfile::Builder::new()
            .prefix("apx-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(document)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        info!("Editing `{}` with `{}`", path.display(), self.command_line);

        let mut command = command_from(&self.command_line)?;
        command.arg(&path);
        run_interactive(command)?;

        fs::read(&path)
            .map_err(|e| Error::io_error("edited".to_string(), path.display().to_string(), e))
    }
}
