//! Host tool checks and package-manager installs.

use std::path::Path;

use tracing::info;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec, ToolLocator};
use crate::gate::Gate;
use crate::ui::{self, DecisionProvider};

/// `apt-get install -y <packages>`
pub fn apt_install<S: AsRef<str>>(packages: &[S], use_sudo: bool) -> CommandSpec {
    CommandSpec::new("apt-get")
        .args(["install", "-y"])
        .args(packages.iter().map(|p| p.as_ref().to_string()))
        .streaming()
        .privileged(use_sudo)
}

/// Make sure git is on PATH, offering to install it.
///
/// Declining ends the run with the git exit code; nothing else runs.
pub fn ensure_git(
    locator: &dyn ToolLocator,
    runner: &dyn CommandRunner,
    decisions: &dyn DecisionProvider,
    use_sudo: bool,
) -> Result<()> {
    if locator.is_available("git") {
        return Ok(());
    }

    Gate::InstallGit.ask(decisions)?;
    ui::display_status("Installing git...");
    runner.run_checked(&apt_install(&["git"], use_sudo))?;
    info!("installed git");
    Ok(())
}

/// Make sure the packaging tools are on PATH, offering to install them.
pub fn ensure_packaging_tools(
    locator: &dyn ToolLocator,
    runner: &dyn CommandRunner,
    decisions: &dyn DecisionProvider,
    build: &BuildConfig,
) -> Result<()> {
    let missing = locator.missing(&build.packaging_tools);
    if missing.is_empty() {
        return Ok(());
    }

    ui::display_status(&format!("Missing tools: {}", missing.join(", ")));
    Gate::InstallPackagingTools.ask(decisions)?;
    runner.run_checked(&apt_install(&build.packaging_packages, build.use_sudo))?;
    info!(packages = ?build.packaging_packages, "installed packaging tools");
    Ok(())
}

/// Offer to install the build dependencies declared by the source tree.
///
/// Returns whether they were installed.
pub fn install_build_deps(
    runner: &dyn CommandRunner,
    decisions: &dyn DecisionProvider,
    source_dir: &Path,
    use_sudo: bool,
) -> Result<bool> {
    if !Gate::InstallBuildDeps.ask(decisions)? {
        info!("skipping build dependency installation");
        return Ok(false);
    }

    let spec = CommandSpec::new("apt-get")
        .args(["build-dep", "-y", "."])
        .current_dir(source_dir)
        .streaming()
        .privileged(use_sudo);
    runner.run_checked(&spec)?;
    Ok(true)
}
