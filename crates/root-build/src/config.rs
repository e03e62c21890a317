//! Tool configuration types (rootbuild.toml format).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name looked up in the invocation root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "rootbuild.toml";

/// Root tool configuration.
///
/// Every section is optional; an empty file yields [`ToolConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// External programs.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Directory layout.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// How step results map to the exit code.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// External programs invoked by the wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Build-configuration tool.
    pub configure: String,
    /// Build-execution tool.
    pub build: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            configure: "cmake".to_string(),
            build: "make".to_string(),
        }
    }
}

/// Build directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Output directory, relative to the invocation root.
    pub build_dir: PathBuf,
    /// Source root handed to the configure tool, relative to `build_dir`.
    pub source_dir: PathBuf,
    /// Unit-test binary, relative to `build_dir`.
    pub test_binary: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("obj"),
            source_dir: PathBuf::from(".."),
            test_binary: PathBuf::from("bin/UnitTests"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub build_failure: BuildFailurePolicy,
}

/// What a failed build step does to the wrapper's exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFailurePolicy {
    /// Exit with the build tool's status.
    #[default]
    Propagate,
    /// Log the failure and exit 0, like the earliest build scripts did.
    Ignore,
}

impl ToolConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the configuration for an invocation.
    ///
    /// An explicit path must exist. Without one, `rootbuild.toml` in `root` is
    /// used if present, otherwise the defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading tool configuration");
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Absolute (or root-relative) build directory.
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.layout.build_dir)
    }
}
