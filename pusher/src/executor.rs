//! External command execution.
//!
//! Builds and scaffolding shell out to the `dotnet` CLI. Routing every call
//! through [`CommandExecutor`] lets tests substitute canned output.

use crate::error::{PusherError, Result};
use camino::Utf8Path;
use log::debug;
use std::process::{Command, Output};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `cmd` with `args` in `cwd`, waiting for it to exit, and returns
    /// the captured output.
    ///
    /// There is no timeout: a command that never exits blocks the caller.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use camino::Utf8Path;
    /// use toitnups_pusher::executor::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("dotnet", &["--version".to_owned()], Utf8Path::new("."))?;
    /// assert!(output.status.success());
    /// # Ok::<(), toitnups_pusher::error::PusherError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output> {
        debug!("running {cmd} {} in {cwd}", args.join(" "));
        Command::new(cmd)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(PusherError::from)
    }
}

/// Summarise a failed command's output for an error message.
///
/// Prefers stderr; `dotnet` reports most build errors on stdout, so that is
/// used when stderr is empty.
#[must_use]
pub fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_owned();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        format!("command exited with {}", output.status)
    } else {
        stdout.to_owned()
    }
}
