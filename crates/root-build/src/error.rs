//! Error types for root-build.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for root-build operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a build run before or between external steps.
///
/// A tool that runs and exits non-zero is not an error here; that is reported
/// through [`crate::ProcessStatus`].
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A keyword expecting a value was the last token.
    #[error("`{flag}` expects a value but none was given")]
    #[diagnostic(
        code(root_build::missing_value),
        help("pass the value as the next argument, e.g. `{flag} \"-O0 -g\"`")
    )]
    MissingValue { flag: &'static str },

    /// Failed to read the tool configuration file.
    #[error("Failed to read config file {}", path.display())]
    #[diagnostic(code(root_build::read_config))]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML tool configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(root_build::parse_config))]
    ParseConfig(#[from] toml::de::Error),

    /// The build directory could not be created.
    #[error("Failed to create build directory {}", path.display())]
    #[diagnostic(code(root_build::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build directory exists but its absolute path could not be resolved.
    #[error("Failed to resolve build directory {}", path.display())]
    #[diagnostic(code(root_build::resolve_dir))]
    ResolveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Something other than a directory occupies the build directory path.
    #[error("{} exists but is not a directory", path.display())]
    #[diagnostic(
        code(root_build::not_a_directory),
        help("remove the file or set `layout.build_dir` in rootbuild.toml")
    )]
    NotADirectory { path: PathBuf },

    /// An external tool could not be started at all.
    #[error("Failed to execute `{program}`")]
    #[diagnostic(code(root_build::spawn), help("is `{program}` installed and on PATH?"))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the dry-run listing failed.
    #[error("Failed to write command listing")]
    #[diagnostic(code(root_build::output))]
    Output(#[source] std::io::Error),
}

impl Error {
    /// Whether the error comes from how the tool was invoked rather than from
    /// the build itself.
    pub fn is_usage(&self) -> bool {
        !matches!(self, Error::Spawn { .. } | Error::Output(_))
    }
}
