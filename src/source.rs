//! Upstream source tree access.
//!
//! Cloning, fetching and checkout go through the `git` CLI so credentials and
//! proxies behave as they do for the user. An existing tree is opened with
//! `git2` to make sure it really is a repository before it is reused.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::SourceConfig;
use crate::domain::BranchSelection;
use crate::error::{DebBuildError, Result};
use crate::exec::{CommandRunner, CommandSpec};
use crate::ui;

/// A checked-out upstream source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    path: PathBuf,
    freshly_cloned: bool,
}

impl SourceTree {
    /// Refer to an existing tree without touching it
    pub fn at(path: impl Into<PathBuf>) -> Self {
        SourceTree {
            path: path.into(),
            freshly_cloned: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this run created the clone
    pub fn freshly_cloned(&self) -> bool {
        self.freshly_cloned
    }

    pub fn debian_dir(&self) -> PathBuf {
        self.path.join("debian")
    }

    pub fn changelog_path(&self) -> PathBuf {
        self.debian_dir().join("changelog")
    }

    pub fn rules_path(&self) -> PathBuf {
        self.debian_dir().join("rules")
    }

    /// Where `dpkg-buildpackage` writes the packages: the tree's parent
    pub fn output_dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

/// Current branch and short commit hash of a repository, e.g. `gaps@1a2b3c4`
pub fn head_summary(path: &Path) -> Result<String> {
    let repo = Repository::open(path)?;
    let head = repo.head()?;
    let branch = head.shorthand().unwrap_or("HEAD").to_string();
    let commit = head.peel_to_commit()?;
    let id = commit.id().to_string();
    Ok(format!("{}@{}", branch, &id[..7.min(id.len())]))
}

fn git(dir: &Path) -> CommandSpec {
    CommandSpec::new("git").current_dir(dir)
}

/// Clone or reuse the source tree and check out the selected branch.
///
/// An existing directory is never re-cloned; it must be a git repository.
/// With `reset_hard` set, the branch is reset to the remote head, which also
/// drops previously applied patches.
pub fn prepare_source(
    runner: &dyn CommandRunner,
    source: &SourceConfig,
    work_dir: &Path,
    branch: &BranchSelection,
) -> Result<SourceTree> {
    let path = work_dir.join(&source.directory);

    let freshly_cloned = if path.exists() {
        Repository::open(&path).map_err(|e| {
            DebBuildError::source_tree(format!(
                "'{}' exists but is not a git repository: {}",
                path.display(),
                e.message()
            ))
        })?;
        ui::display_boundary_warning(&BoundaryWarning::SourceTreeExists { path: path.clone() });

        runner.run_checked(&git(&path).args(["fetch", source.remote.as_str()]))?;
        runner.run_checked(&git(&path).args(["checkout", branch.name()]))?;
        if source.reset_hard {
            let target = format!("{}/{}", source.remote, branch.name());
            runner.run_checked(&git(&path).args(["reset", "--hard", target.as_str()]))?;
        }
        false
    } else {
        ui::display_status(&format!("Cloning {} ({})", source.repository, branch.name()));
        let spec = CommandSpec::new("git")
            .args(["clone", "--branch", branch.name()])
            .arg(source.repository.as_str())
            .arg(path.to_string_lossy())
            .current_dir(work_dir)
            .streaming();
        runner.run_checked(&spec)?;
        true
    };

    match head_summary(&path) {
        Ok(summary) => info!(head = %summary, "source tree ready"),
        Err(e) => warn!("cannot read source tree head: {}", e),
    }

    Ok(SourceTree {
        path,
        freshly_cloned,
    })
}
