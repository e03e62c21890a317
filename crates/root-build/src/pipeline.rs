//! The configure, build, test sequence.

use std::fmt;
use std::path::Path;

use crate::command::ToolCommand;
use crate::config::{BuildFailurePolicy, ToolConfig};
use crate::error::{Error, Result};
use crate::layout::prepare_build_dir;
use crate::options::BuildOptions;
use crate::runner::{ProcessRunner, ProcessStatus, Step};

/// Exit code used when the configure step fails.
pub const CONFIGURE_FAILED_EXIT: i32 = 1;

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ArgsParsed,
    DirReady,
    Configured,
    Built,
    Tested,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ArgsParsed => "args-parsed",
            Stage::DirReady => "dir-ready",
            Stage::Configured => "configured",
            Stage::Built => "built",
            Stage::Tested => "tested",
        })
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Last stage reached.
    pub reached: Stage,
    /// Exit code the wrapper should terminate with.
    pub exit_code: i32,
    pub configure: Option<ProcessStatus>,
    pub build: Option<ProcessStatus>,
    pub test: Option<ProcessStatus>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            reached: Stage::ArgsParsed,
            exit_code: 0,
            configure: None,
            build: None,
            test: None,
        }
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(from = %self.reached, to = %stage, "stage transition");
        self.reached = stage;
    }
}

/// One wrapper invocation: options plus tool configuration.
pub struct Pipeline<'a> {
    config: &'a ToolConfig,
    options: &'a BuildOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ToolConfig, options: &'a BuildOptions) -> Self {
        Self { config, options }
    }

    /// Run every step against the invocation root `root`.
    ///
    /// Tool failures end up in the report. `Err` means the run could not
    /// proceed at all: the build directory is unusable, or the configure tool
    /// (or, under [`BuildFailurePolicy::Propagate`], the build tool) could not
    /// be started.
    pub fn run(&self, root: &Path, runner: &mut dyn ProcessRunner) -> Result<RunReport> {
        let mut report = RunReport::new();

        let build_dir = prepare_build_dir(&self.config.build_dir(root))?;
        report.advance(Stage::DirReady);

        let configure = ToolCommand::configure(self.options, self.config, &build_dir);
        tracing::info!("configuring: {}", configure);
        let status = runner.run(Step::Configure, &configure)?;
        report.configure = Some(status);
        if !status.success() {
            tracing::error!("configure step failed ({}), not building", status);
            report.exit_code = CONFIGURE_FAILED_EXIT;
            return Ok(report);
        }
        report.advance(Stage::Configured);

        let build = ToolCommand::build(self.options, self.config, &build_dir);
        tracing::info!("building: {}", build);
        let status = match runner.run(Step::Build, &build) {
            Ok(status) => status,
            Err(err @ Error::Spawn { .. }) => match self.config.policy.build_failure {
                BuildFailurePolicy::Propagate => return Err(err),
                BuildFailurePolicy::Ignore => {
                    tracing::warn!("{}, ignoring", err);
                    ProcessStatus::from_code(1)
                }
            },
            Err(err) => return Err(err),
        };
        report.build = Some(status);
        report.advance(Stage::Built);

        if !status.success() {
            match self.config.policy.build_failure {
                BuildFailurePolicy::Propagate => {
                    tracing::error!("build step failed ({})", status);
                    report.exit_code = status.code.filter(|&code| code != 0).unwrap_or(1);
                }
                BuildFailurePolicy::Ignore => {
                    tracing::warn!("build step failed ({}), exiting 0 anyway", status);
                }
            }
            return Ok(report);
        }

        if self.options.run_tests {
            let test = ToolCommand::test(self.config, &build_dir);
            tracing::info!("running tests: {}", test);
            // The test binary's status is reported but never affects the
            // exit code.
            match runner.run(Step::Test, &test) {
                Ok(status) => {
                    if status.success() {
                        tracing::info!("tests passed");
                    } else {
                        tracing::warn!("tests finished with {}", status);
                    }
                    report.test = Some(status);
                    report.advance(Stage::Tested);
                }
                // A binary that never started does not count as tested.
                Err(err) => tracing::warn!("{}, tests not run", err),
            }
        }

        tracing::info!(stage = %report.reached, "done");
        Ok(report)
    }
}
