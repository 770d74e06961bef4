//! Locating, installing and removing the packages a run produced.
//!
//! Artifacts are found by the build tag embedded in their file names.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::info;

use crate::domain::BuildTag;
use crate::error::{DebBuildError, Result};
use crate::exec::{CommandRunner, CommandSpec};

/// Glob pattern matching the `.deb` files of one run in `dir`
pub fn artifact_pattern(dir: &Path, tag: &BuildTag) -> String {
    format!(
        "{}/*{}*.deb",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(tag.as_str())
    )
}

/// Every `.deb` in `dir` carrying the build tag, sorted.
///
/// `dir` is the parent of the source tree, where `dpkg-buildpackage` leaves
/// its output.
pub fn locate(dir: &Path, tag: &BuildTag) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in glob::glob(&artifact_pattern(dir, tag))? {
        let path = entry.map_err(|e| DebBuildError::Io(e.into_error()))?;
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    info!(count = found.len(), tag = %tag, "located artifacts");
    Ok(found)
}

/// One `dpkg -i` call covering every artifact
pub fn install_command(artifacts: &[PathBuf], use_sudo: bool) -> CommandSpec {
    CommandSpec::new("dpkg")
        .arg("-i")
        .args(artifacts.iter().map(|p| p.to_string_lossy().into_owned()))
        .streaming()
        .privileged(use_sudo)
}

/// Install all artifacts in a single package-manager call.
///
/// A non-zero exit (including a partial install) is fatal.
pub fn install(runner: &dyn CommandRunner, artifacts: &[PathBuf], use_sudo: bool) -> Result<()> {
    runner.run_checked(&install_command(artifacts, use_sudo))?;
    info!(count = artifacts.len(), "installed packages");
    Ok(())
}

/// Remove every regular file in `dir` whose name contains the build tag.
/// Returns the removed paths, sorted.
pub fn cleanup(dir: &Path, tag: &BuildTag) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if tag.is_in(&entry.file_name().to_string_lossy()) {
            let path = entry.path();
            fs::remove_file(&path)?;
            removed.push(path);
        }
    }
    removed.sort();
    info!(count = removed.len(), tag = %tag, "removed build files");
    Ok(removed)
}
