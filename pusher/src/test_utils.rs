//! Shared test utilities for the pusher crate.

use crate::error::{PusherError, Result};
use crate::executor::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "dotnet").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// Files to create, relative to the working directory, before returning.
    pub creates: Vec<(Utf8PathBuf, Vec<u8>)>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `cmd args` and return `result`.
    #[must_use]
    pub fn new(cmd: &'static str, args: Vec<&'static str>, result: Result<Output>) -> Self {
        Self {
            cmd,
            args,
            creates: Vec::new(),
            result,
        }
    }

    /// Also write `contents` to `relative` under the working directory, the way
    /// the real command would leave files behind.
    #[must_use]
    pub fn creating(mut self, relative: impl Into<Utf8PathBuf>, contents: &[u8]) -> Self {
        self.creates.push((relative.into(), contents.to_vec()));
        self
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects beyond
/// the files each call declares.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output> {
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PusherError::StubMismatch {
                message: format!("unexpected invocation: {cmd} {}", args.join(" ")),
            })?;

        if call.cmd != cmd || call.args != args {
            return Err(PusherError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{cmd} {}`",
                    call.cmd,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        for (relative, contents) in &call.creates {
            let path = cwd.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
        }

        call.result
    }
}
