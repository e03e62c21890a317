//! Keyword token parsing.
//!
//! The wrapper takes bare keywords rather than `--flags`:
//!
//! ```text
//! rootbuild verbose nosimd extraflags "-O0 -g"
//! ```
//!
//! Every keyword is an independent switch except `extraflags`, which takes the
//! following token as its value no matter what that token says.

use std::ffi::OsStr;

use crate::error::{Error, Result};

/// Keyword taking the next token as the extra-flags value.
pub const EXTRA_FLAGS: &str = "extraflags";
/// Keyword enabling verbose build-tool output.
pub const VERBOSE: &str = "verbose";
/// Keyword enabling the demo programs.
pub const WITH_DEMOS: &str = "withdemos";
/// Keyword selecting the testing build type and the post-build test run.
pub const TESTING: &str = "testing";
/// Keyword disabling SIMD code paths.
pub const NO_SIMD: &str = "nosimd";

/// CMake build type requested for the configure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Default,
    Testing,
}

impl BuildType {
    /// Value passed as `CMAKE_BUILD_TYPE`.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Default => "Default",
            BuildType::Testing => "Testing",
        }
    }
}

/// Options derived from the command-line keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Free-form flags forwarded to the configure step as `EXTRA_FLAGS`.
    pub extra_flags: String,
    /// Pass `VERBOSE=1` to the build tool.
    pub verbose: bool,
    /// Compile the demo programs.
    pub demos: bool,
    /// Enable SIMD code paths.
    pub simd: bool,
    /// Build type for the configure step.
    pub build_type: BuildType,
    /// Run the unit-test binary after a successful build.
    pub run_tests: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            extra_flags: String::new(),
            verbose: false,
            demos: false,
            simd: true,
            build_type: BuildType::Default,
            run_tests: false,
        }
    }
}

impl BuildOptions {
    /// Parse keyword tokens (program name already stripped).
    ///
    /// Unknown tokens are ignored, including ones that are not valid UTF-8.
    /// An `extraflags` value that is not valid UTF-8 is converted lossily.
    pub fn parse<S: AsRef<OsStr>>(tokens: &[S]) -> Result<Self> {
        let mut options = Self::default();

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_ref();
            match token.to_str() {
                Some(EXTRA_FLAGS) => {
                    let value = tokens
                        .get(i + 1)
                        .ok_or(Error::MissingValue { flag: EXTRA_FLAGS })?;
                    options.extra_flags = value.as_ref().to_string_lossy().into_owned();
                    i += 2;
                    continue;
                }
                Some(VERBOSE) => options.verbose = true,
                Some(WITH_DEMOS) => options.demos = true,
                Some(TESTING) => {
                    options.build_type = BuildType::Testing;
                    options.run_tests = true;
                }
                Some(NO_SIMD) => options.simd = false,
                _ => tracing::debug!(?token, "ignoring unrecognized token"),
            }
            i += 1;
        }

        Ok(options)
    }
}
