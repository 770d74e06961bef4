//! Patch set application and build-rule overrides.
//!
//! Every patch is first tried with `--dry-run`. When the tool reports hunks
//! as already applied, the whole patch must also reverse cleanly before it is
//! skipped with a warning; a partly present patch and any other failure are
//! fatal.
//! The override block appended to `debian/rules` is not guarded, so each run
//! adds it again.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::PatchesConfig;
use crate::error::{DebBuildError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec};
use crate::source::SourceTree;
use crate::ui;

/// Text GNU patch prints for a hunk that is already present in the tree
pub const ALREADY_APPLIED_MARKER: &str = "Reversed (or previously applied) patch detected";

/// What happened to one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyApplied,
}

/// Ordered list of patch files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    patches: Vec<PathBuf>,
}

impl PatchSet {
    pub fn new(patches: Vec<PathBuf>) -> Self {
        PatchSet { patches }
    }

    /// Resolve the configured patch set against the work directory.
    ///
    /// Explicit `files` keep their order. Otherwise every `*.patch` in the
    /// directory is used, sorted by name. A missing directory gives an empty
    /// set.
    pub fn discover(config: &PatchesConfig, work_dir: &Path) -> Result<Self> {
        let dir = work_dir.join(&config.directory);

        if let Some(ref files) = config.files {
            return Ok(PatchSet::new(files.iter().map(|f| dir.join(f)).collect()));
        }

        if !dir.is_dir() {
            ui::display_boundary_warning(&BoundaryWarning::PatchDirectoryMissing { path: dir });
            return Ok(PatchSet::default());
        }

        let pattern = dir.join("*.patch");
        let mut patches = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            match entry {
                Ok(path) => patches.push(path),
                Err(e) => return Err(DebBuildError::Io(e.into_error())),
            }
        }
        patches.sort();
        Ok(PatchSet::new(patches))
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.patches.iter()
    }
}

fn patch_command(tree: &SourceTree, patch: &Path, dry_run: bool) -> CommandSpec {
    let mut spec = CommandSpec::new("patch").args(["--forward", "--batch", "-p1"]);
    if dry_run {
        spec = spec.arg("--dry-run");
    }
    spec.arg("-i")
        .arg(patch.to_string_lossy())
        .current_dir(tree.path())
        .env("LC_ALL", "C")
}

// `--force` stops patch from treating unreversed hunks as reversed, so every
// file of the patch must already carry its change for this to succeed.
fn reverse_check_command(tree: &SourceTree, patch: &Path) -> CommandSpec {
    CommandSpec::new("patch")
        .args(["--reverse", "--force", "--dry-run", "-p1", "-i"])
        .arg(patch.to_string_lossy())
        .current_dir(tree.path())
        .env("LC_ALL", "C")
}

fn patch_failure(spec: &CommandSpec, output: &CommandOutput) -> DebBuildError {
    DebBuildError::CommandFailed {
        command: spec.display(),
        code: output.code,
        stderr: format!("{}{}", output.stdout, output.stderr)
            .trim()
            .to_string(),
    }
}

/// Whether a failed patch run complained about hunks already present and
/// nothing else. Some other file of the patch may still be unpatched.
pub fn reports_already_applied(output: &CommandOutput) -> bool {
    let text = format!("{}{}", output.stdout, output.stderr);
    text.contains(ALREADY_APPLIED_MARKER) && !text.contains("FAILED")
}

/// Apply one patch to the source tree.
///
/// # Returns
/// * `Ok(PatchOutcome::Applied)` - The tree was changed
/// * `Ok(PatchOutcome::AlreadyApplied)` - Every change of the patch was already present
/// * `Err` - The patch does not apply, or is only partly present
pub fn apply_patch(
    runner: &dyn CommandRunner,
    tree: &SourceTree,
    patch: &Path,
) -> Result<PatchOutcome> {
    if !patch.is_file() {
        return Err(DebBuildError::source_tree(format!(
            "Patch file not found: {}",
            patch.display()
        )));
    }

    let name = patch
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| patch.display().to_string());

    let check = patch_command(tree, patch, true);
    debug!(command = %check.display(), "checking patch");
    let output = runner.run(&check)?;
    if !output.is_success() {
        if !reports_already_applied(&output) {
            return Err(patch_failure(&check, &output));
        }

        let reverse = reverse_check_command(tree, patch);
        debug!(command = %reverse.display(), "checking patch is fully present");
        if !runner.run(&reverse)?.is_success() {
            return Err(patch_failure(&check, &output));
        }

        ui::display_boundary_warning(&BoundaryWarning::PatchAlreadyApplied { patch: name });
        return Ok(PatchOutcome::AlreadyApplied);
    }

    runner.run_checked(&patch_command(tree, patch, false))?;
    info!(patch = %name, "applied patch");
    Ok(PatchOutcome::Applied)
}

/// Apply a whole patch set in order, stopping at the first failure.
pub fn apply_all(
    runner: &dyn CommandRunner,
    tree: &SourceTree,
    patches: &PatchSet,
) -> Result<Vec<(PathBuf, PatchOutcome)>> {
    let mut outcomes = Vec::with_capacity(patches.len());
    for patch in patches.iter() {
        let outcome = apply_patch(runner, tree, patch)?;
        outcomes.push((patch.clone(), outcome));
    }
    Ok(outcomes)
}

/// Append the override block to `debian/rules`.
///
/// Not idempotent: running it twice leaves two copies of the block.
pub fn append_rules_overrides(tree: &SourceTree, block: &str) -> Result<()> {
    let rules = tree.rules_path();
    if !rules.is_file() {
        return Err(DebBuildError::source_tree(format!(
            "Build rules not found: {}",
            rules.display()
        )));
    }

    let mut file = OpenOptions::new().append(true).open(&rules)?;
    if !block.starts_with('\n') {
        file.write_all(b"\n")?;
    }
    file.write_all(block.as_bytes())?;
    if !block.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    info!(rules = %rules.display(), "appended build rule overrides");
    Ok(())
}

/// Number of times `block` occurs in `debian/rules`.
pub fn count_overrides(tree: &SourceTree, block: &str) -> Result<usize> {
    let content = fs::read_to_string(tree.rules_path())?;
    let needle = block.trim();
    if needle.is_empty() {
        return Ok(0);
    }
    Ok(content.matches(needle).count())
}
