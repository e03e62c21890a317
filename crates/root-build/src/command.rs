//! External tool command lines.
//!
//! Commands are kept as a program plus an argv vector and are never run
//! through a shell. Each CMake definition is exactly one argv element, so an
//! extra-flags value with spaces reaches CMake intact.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ToolConfig;
use crate::options::BuildOptions;

/// CMake cache entry enabling the SIMD code paths.
pub const SIMD_DEFINE: &str = "ROOT_USE_SIMD";
/// CMake cache entry enabling the demo programs.
pub const DEMOS_DEFINE: &str = "ROOT_COMPILE_DEMOS";
/// CMake cache entry selecting the build type.
pub const BUILD_TYPE_DEFINE: &str = "CMAKE_BUILD_TYPE";
/// CMake cache entry carrying free-form compiler flags.
pub const EXTRA_FLAGS_DEFINE: &str = "EXTRA_FLAGS";
/// Make variable turning on full command echo.
pub const VERBOSE_ARG: &str = "VERBOSE=1";

/// A single external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ToolCommand {
    /// Create a command with no arguments running in `working_dir`.
    pub fn new(program: impl Into<PathBuf>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a `-D<name>=<value>` definition.
    pub fn define(self, name: &str, value: &str) -> Self {
        self.arg(format!("-D{}={}", name, value))
    }

    /// The configure step: `cmake <source> -D...`.
    pub fn configure(options: &BuildOptions, config: &ToolConfig, build_dir: &Path) -> Self {
        let mut cmd = Self::new(&config.tools.configure, build_dir)
            .arg(config.layout.source_dir.to_string_lossy());

        if options.simd {
            cmd = cmd.define(SIMD_DEFINE, "1");
        }

        if options.demos {
            cmd = cmd.define(DEMOS_DEFINE, "1");
        }

        cmd.define(BUILD_TYPE_DEFINE, options.build_type.as_str())
            // Always passed, even when empty, so a previous value in the
            // CMake cache gets cleared.
            .define(EXTRA_FLAGS_DEFINE, &options.extra_flags)
    }

    /// The build step: `make [VERBOSE=1]`.
    pub fn build(options: &BuildOptions, config: &ToolConfig, build_dir: &Path) -> Self {
        let cmd = Self::new(&config.tools.build, build_dir);
        if options.verbose {
            cmd.arg(VERBOSE_ARG)
        } else {
            cmd
        }
    }

    /// The unit-test binary, run without arguments.
    ///
    /// `build_dir` should be absolute (see [`crate::prepare_build_dir`]): a
    /// relative program path combined with `current_dir` is resolved
    /// differently across platforms.
    pub fn test(config: &ToolConfig, build_dir: &Path) -> Self {
        // Joined rather than passed bare so PATH is never searched.
        Self::new(build_dir.join(&config.layout.test_binary), build_dir)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Program name for messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Build the `std::process::Command`, with stdio inherited.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.current_dir(&self.working_dir);
        cmd
    }
}

/// Shell-quoted rendering, for logs and `--dry-run`.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));

    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
