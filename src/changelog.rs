//! Version sources and changelog recording.
//!
//! The two version sources are the newest `debian/changelog` entry and the
//! upstream marker file (`I3_VERSION`). The reconciled version is written back
//! as a new changelog entry with `dch`.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::PackageConfig;
use crate::domain::{reconcile, DebVersion};
use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec};
use crate::source::SourceTree;
use crate::ui;

/// Version of the newest changelog entry, without its Debian revision.
///
/// # Example
/// ```ignore
/// let text = "i3-wm (4.18.2-1) unstable; urgency=medium\n";
/// assert_eq!(history_version(text).unwrap().to_string(), "4.18.2");
/// ```
pub fn history_version(changelog: &str) -> Option<DebVersion> {
    let header = changelog.lines().find(|line| !line.trim().is_empty())?;
    let re = Regex::new(r"^[a-z0-9][a-z0-9.+-]*\s+\(([^()\s]+)\)").ok()?;
    let captures = re.captures(header)?;
    DebVersion::parse(&captures[1])
        .ok()
        .map(|version| version.without_revision())
}

/// Upstream version from the marker file content.
///
/// Only the first whitespace-separated token counts, cut at the first `-`,
/// so `4.18.2-non-git` and `4.18.2 (2020-07-26)` both read as `4.18.2`.
/// The result must start with a digit.
pub fn marker_version(marker: &str) -> Option<DebVersion> {
    let token = marker.split_whitespace().next()?;
    let upstream = token.split('-').next()?;
    if !upstream.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    DebVersion::parse(upstream).ok()
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %path.display(), "cannot read version source: {}", e);
            None
        }
    }
}

/// Read both version sources and reconcile them.
///
/// Missing or unparseable sources are reported as warnings and count as
/// `0.0.0`.
pub fn reconcile_sources(tree: &SourceTree, package: &PackageConfig) -> DebVersion {
    let changelog_path = tree.changelog_path();
    let marker_path = tree.path().join(&package.marker_file);

    let history = read_optional(&changelog_path).and_then(|text| history_version(&text));
    if history.is_none() {
        ui::display_boundary_warning(&BoundaryWarning::VersionSourceMissing {
            source: changelog_path.display().to_string(),
        });
    }

    let marker = read_optional(&marker_path).and_then(|text| marker_version(&text));
    if marker.is_none() {
        ui::display_boundary_warning(&BoundaryWarning::VersionSourceMissing {
            source: marker_path.display().to_string(),
        });
    }

    if history.is_none() && marker.is_none() {
        ui::display_boundary_warning(&BoundaryWarning::NoVersionSources);
    }

    info!(
        history = ?history.as_ref().map(ToString::to_string),
        marker = ?marker.as_ref().map(ToString::to_string),
        "reconciling versions"
    );
    reconcile(history, marker)
}

/// `dch` invocation adding a changelog entry for `version`.
pub fn dch_command(tree: &SourceTree, package: &PackageConfig, version: &str) -> CommandSpec {
    CommandSpec::new("dch")
        .args(["--newversion", version])
        .args(["--distribution", package.distribution.as_str()])
        .args(["--force-distribution", "--force-bad-version", "--"])
        .arg(package.changelog_message.as_str())
        .current_dir(tree.path())
        .env("DEBFULLNAME", package.maintainer_name.as_str())
        .env("DEBEMAIL", package.maintainer_email.as_str())
}

/// Record the new package version in the changelog.
pub fn record_version(
    runner: &dyn CommandRunner,
    tree: &SourceTree,
    package: &PackageConfig,
    version: &str,
) -> Result<()> {
    runner.run_checked(&dch_command(tree, package, version))?;
    info!(version, "recorded changelog entry");
    Ok(())
}
