//! Out-of-source build driver for the Root engine.
//!
//! This crate provides:
//! - Keyword token parsing (`verbose`, `nosimd`, `extraflags <value>`, ...)
//! - The optional tool configuration file (`rootbuild.toml`)
//! - CMake and make command construction
//! - A configure, build, test pipeline over a pluggable process runner
//!
//! # Example
//!
//! ```no_run
//! use root_build::{BuildOptions, Pipeline, SystemRunner, ToolConfig};
//! use std::path::Path;
//!
//! let options = BuildOptions::parse(&["verbose", "extraflags", "-O0 -g"])?;
//! let config = ToolConfig::default();
//! let report = Pipeline::new(&config, &options).run(Path::new("."), &mut SystemRunner)?;
//! std::process::exit(report.exit_code);
//! # Ok::<(), root_build::Error>(())
//! ```

mod command;
mod config;
mod error;
mod layout;
mod options;
mod pipeline;
mod runner;

pub use command::ToolCommand;
pub use config::{
    BuildFailurePolicy, LayoutConfig, PolicyConfig, ToolConfig, ToolsConfig, CONFIG_FILE_NAME,
};
pub use error::{Error, Result};
pub use layout::prepare_build_dir;
pub use options::{BuildOptions, BuildType};
pub use pipeline::{Pipeline, RunReport, Stage, CONFIGURE_FAILED_EXIT};
pub use runner::{DryRunRunner, ProcessRunner, ProcessStatus, Step, SystemRunner};

/// Exit code for invocation errors (bad tokens, bad config, unusable build directory).
pub const USAGE_EXIT: i32 = 2;
