//! Running external tools.

use std::fmt;
use std::io::Write;

use crate::command::ToolCommand;
use crate::error::{Error, Result};

/// Which external step a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Configure,
    Build,
    Test,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Test => "test",
        })
    }
}

/// How an external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ProcessStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Executes external commands to completion.
pub trait ProcessRunner {
    /// Run `cmd` and wait for it. `Err` only when it could not be started.
    fn run(&mut self, step: Step, cmd: &ToolCommand) -> Result<ProcessStatus>;
}

/// Runs commands as child processes sharing this process's stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, step: Step, cmd: &ToolCommand) -> Result<ProcessStatus> {
        tracing::debug!(%step, dir = %cmd.working_dir().display(), "running {}", cmd);

        let status = cmd.to_command().status().map_err(|source| Error::Spawn {
            program: cmd.program_name(),
            source,
        })?;

        Ok(status.into())
    }
}

/// Prints commands instead of running them; every step succeeds.
pub struct DryRunRunner<W> {
    out: W,
}

impl<W: Write> DryRunRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProcessRunner for DryRunRunner<W> {
    fn run(&mut self, step: Step, cmd: &ToolCommand) -> Result<ProcessStatus> {
        writeln!(self.out, "({}) cd {} && {}", step, cmd.working_dir().display(), cmd)
            .map_err(Error::Output)?;
        Ok(ProcessStatus::SUCCESS)
    }
}
