// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Running the external tools (`ibtool`, `hiutil`, `killall`).
//!
//! The drivers never touch [`std::process`] directly. They build a
//! [`ToolCommand`] and hand it to an [`Invoker`], which runs it through
//! a [`CommandRunner`] and applies the [`ExitPolicy`].

use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::io;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// A program together with its argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }
}

impl Display for ToolCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished tool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a [`ToolCommand`] to completion.
pub trait CommandRunner {
    /// Runs `command` and waits for it. An `Err` means the process could
    /// not be started at all; a non-zero exit is reported in the output.
    fn run(&mut self, command: &ToolCommand) -> io::Result<ToolOutput>;
}

/// Runs commands as real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> io::Result<ToolOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()?;
        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// What to do when a tool exits unsuccessfully.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Log a warning and carry on with the next file.
    #[default]
    Lenient,
    /// Abort the run with [`Error::ToolFailed`].
    FailFast,
}

impl ExitPolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            ExitPolicy::FailFast
        } else {
            ExitPolicy::Lenient
        }
    }
}

/// Runs tool commands sequentially and applies an [`ExitPolicy`].
#[derive(Debug)]
pub struct Invoker<R> {
    runner: R,
    policy: ExitPolicy,
}

impl<R: CommandRunner> Invoker<R> {
    pub fn new(runner: R, policy: ExitPolicy) -> Self {
        Self { runner, policy }
    }

    pub fn policy(&self) -> ExitPolicy {
        self.policy
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Runs `command`, failing if it cannot be started or, under
    /// [`ExitPolicy::FailFast`], if it exits unsuccessfully.
    pub fn invoke(&mut self, command: &ToolCommand) -> Result<ToolOutput> {
        info!("Running {command}");
        let output = self.runner.run(command).map_err(|source| Error::Spawn {
            program: command.program.clone(),
            source,
        })?;
        log_output(command, &output);

        if !output.success() {
            match self.policy {
                ExitPolicy::Lenient => {
                    warn!(status = ?output.status, "{} failed, continuing", command.program);
                }
                ExitPolicy::FailFast => {
                    return Err(Error::ToolFailed {
                        program: command.program.clone(),
                        status: output.status,
                    });
                }
            }
        }
        Ok(output)
    }

    /// Runs `command` and ignores every kind of failure, including a
    /// missing program. The exit policy does not apply.
    pub fn invoke_best_effort(&mut self, command: &ToolCommand) -> Option<ToolOutput> {
        info!("Running {command}");
        match self.runner.run(command) {
            Ok(output) => {
                log_output(command, &output);
                Some(output)
            }
            Err(err) => {
                warn!("Could not run {}: {err}", command.program);
                None
            }
        }
    }
}

fn log_output(command: &ToolCommand, output: &ToolOutput) {
    if !output.stdout.is_empty() {
        debug!(
            "{} stdout:\n{}",
            command.program,
            String::from_utf8_lossy(&output.stdout).trim_end()
        );
    }
    if !output.stderr.is_empty() {
        debug!(
            "{} stderr:\n{}",
            command.program,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// Records every command instead of running it.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub commands: Vec<ToolCommand>,
        statuses: HashMap<String, i32>,
        missing: HashSet<String>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every run of `program` exit with `status`.
        pub fn with_status(mut self, program: &str, status: i32) -> Self {
            self.statuses.insert(String::from(program), status);
            self
        }

        /// Makes every run of `program` fail to start.
        pub fn with_missing(mut self, program: &str) -> Self {
            self.missing.insert(String::from(program));
            self
        }

        /// The recorded commands as lossy strings, program first.
        pub fn command_lines(&self) -> Vec<Vec<String>> {
            self.commands
                .iter()
                .map(|command| {
                    std::iter::once(command.program.clone())
                        .chain(
                            command
                                .args
                                .iter()
                                .map(|arg| arg.to_string_lossy().into_owned()),
                        )
                        .collect()
                })
                .collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, command: &ToolCommand) -> io::Result<ToolOutput> {
            self.commands.push(command.clone());
            if self.missing.contains(&command.program) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", command.program),
                ));
            }
            Ok(ToolOutput {
                status: Some(self.statuses.get(&command.program).copied().unwrap_or(0)),
                ..ToolOutput::default()
            })
        }
    }
}
