//! Build directory preparation.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Make sure the build directory exists and return its absolute path.
///
/// The process working directory is left alone; callers hand the returned
/// path to each external command instead. The path is absolute so that
/// anything joined onto it means the same thing in a child running inside it.
pub fn prepare_build_dir(build_dir: &Path) -> Result<PathBuf> {
    if build_dir.is_dir() {
        tracing::debug!(path = %build_dir.display(), "build directory already exists");
        return resolve(build_dir);
    }

    if build_dir.exists() {
        return Err(Error::NotADirectory {
            path: build_dir.to_path_buf(),
        });
    }

    // Not atomic with the check above; two concurrent runs may both get here.
    std::fs::create_dir_all(build_dir).map_err(|source| Error::CreateDir {
        path: build_dir.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %build_dir.display(), "created build directory");

    resolve(build_dir)
}

fn resolve(build_dir: &Path) -> Result<PathBuf> {
    build_dir.canonicalize().map_err(|source| Error::ResolveDir {
        path: build_dir.to_path_buf(),
        source,
    })
}
