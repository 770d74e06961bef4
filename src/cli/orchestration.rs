//! Main workflow orchestration logic
//!
//! This module runs one complete build: tool checks, source checkout,
//! versioning, patching, the package build, installation and cleanup. It is
//! kept apart from argument parsing so the whole run can be driven from tests
//! with scripted commands and answers.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::artifacts;
use crate::boundary::BoundaryWarning;
use crate::changelog;
use crate::config::Config;
use crate::domain::{package_version, BranchSelection, BuildTag, DebVersion};
use crate::error::{DebBuildError, Result};
use crate::exec::{CommandRunner, CommandSpec, ToolLocator};
use crate::gate::Gate;
use crate::patching::{self, PatchOutcome, PatchSet};
use crate::source::{self, SourceTree};
use crate::toolchain;
use crate::ui::{self, DecisionProvider};
use crate::user_config;

/// Arguments for the build workflow
///
/// Everything the run needs from its environment, so the workflow can be
/// called without touching the process state.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWorkflowArgs {
    /// Directory holding the source tree, the patches and the built packages
    pub work_dir: PathBuf,

    /// Tag embedded in every package version of this run
    pub build_tag: BuildTag,

    /// Home directory searched for i3 config files; `None` skips the offer
    pub home_dir: Option<PathBuf>,
}

/// External effects used by the workflow
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub runner: &'a dyn CommandRunner,
    pub tools: &'a dyn ToolLocator,
    pub decisions: &'a dyn DecisionProvider,
}

/// Settings fixed for the rest of a run once the branch is chosen
#[derive(Debug, Clone, PartialEq)]
pub struct BuildContext {
    pub work_dir: PathBuf,
    pub config: Config,
    pub branch: BranchSelection,
    pub build_tag: BuildTag,
}

/// Version decided for the packages of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    /// Reconciled upstream version
    pub base: DebVersion,

    /// Full Debian version written to the changelog
    pub package_version: String,
}

impl ReleasePlan {
    fn new(base: DebVersion, context: &BuildContext) -> Self {
        let package_version = package_version(
            &base,
            &context.config.package.build_suffix,
            context.build_tag.as_str(),
        );
        ReleasePlan {
            base,
            package_version,
        }
    }
}

/// Result of a successful build workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The branch that was built
    pub branch: String,

    /// The package version recorded in the changelog
    pub version: String,

    /// The build tag of this run
    pub build_tag: String,

    /// Patches in application order with what happened to each
    pub patches: Vec<(PathBuf, PatchOutcome)>,

    /// Packages produced by this run
    pub artifacts: Vec<PathBuf>,

    /// Whether the packages were installed
    pub installed: bool,

    /// User config files the gaps settings were appended to
    pub user_configs: Vec<PathBuf>,

    /// Files removed by cleanup
    pub removed: Vec<PathBuf>,
}

fn build_command(context: &BuildContext, tree: &SourceTree) -> Result<CommandSpec> {
    let (program, args) = context
        .config
        .build
        .command
        .split_first()
        .ok_or_else(|| DebBuildError::config("build.command must not be empty"))?;
    Ok(CommandSpec::new(program.as_str())
        .args(args.iter().cloned())
        .current_dir(tree.path())
        .streaming())
}

fn select_branch(config: &Config, decisions: &dyn DecisionProvider) -> Result<BranchSelection> {
    let gate = Gate::UseNextBranch {
        stable: config.source.stable_branch.clone(),
        next: config.source.next_branch.clone(),
    };
    let use_next = gate.ask(decisions)?;
    Ok(BranchSelection::from_choice(&config.source, use_next))
}

fn plan_release(
    deps: &Collaborators<'_>,
    context: &BuildContext,
    tree: &SourceTree,
) -> Result<ReleasePlan> {
    let base = changelog::reconcile_sources(tree, &context.config.package);
    let plan = ReleasePlan::new(base, context);
    ui::display_status(&format!(
        "Upstream {} -> package {}",
        plan.base, plan.package_version
    ));
    changelog::record_version(
        deps.runner,
        tree,
        &context.config.package,
        &plan.package_version,
    )?;
    Ok(plan)
}

fn patch_tree(
    deps: &Collaborators<'_>,
    context: &BuildContext,
    tree: &SourceTree,
) -> Result<Vec<(PathBuf, PatchOutcome)>> {
    let patches = PatchSet::discover(&context.config.patches, &context.work_dir)?;
    let outcomes = patching::apply_all(deps.runner, tree, &patches)?;
    let applied = outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == PatchOutcome::Applied)
        .count();
    ui::display_success(&format!(
        "Applied {} of {} patch(es)",
        applied,
        outcomes.len()
    ));

    patching::append_rules_overrides(tree, &context.config.patches.rules_overrides)?;
    Ok(outcomes)
}

fn install_artifacts(
    deps: &Collaborators<'_>,
    context: &BuildContext,
    found: &[PathBuf],
) -> Result<bool> {
    if found.is_empty() {
        ui::display_boundary_warning(&BoundaryWarning::NoArtifacts {
            build_tag: context.build_tag.to_string(),
        });
        return Ok(false);
    }

    for artifact in found {
        ui::display_status(&format!("Built {}", artifact.display()));
    }
    if !Gate::InstallPackages.ask(deps.decisions)? {
        return Ok(false);
    }
    artifacts::install(deps.runner, found, context.config.build.use_sudo)?;
    ui::display_success("Packages installed");
    Ok(true)
}

fn offer_user_config(deps: &Collaborators<'_>, home: Option<&Path>) -> Result<Vec<PathBuf>> {
    match home {
        Some(home) => user_config::offer_append(deps.decisions, home),
        None => Ok(Vec::new()),
    }
}

/// Main build workflow
///
/// Orchestrates the entire build:
/// 1. Make sure git and the packaging tools are installed
/// 2. Choose the stable or next branch
/// 3. Clone or reuse the source tree
/// 4. Reconcile the upstream version and record the package version
/// 5. Apply the patch set and the build rule overrides
/// 6. Optionally install build dependencies, then build
/// 7. Locate the tagged packages and optionally install them
/// 8. Optionally extend the user's i3 config and clean up
///
/// # Returns
///
/// What the run produced, or the first fatal error. A declined required
/// gate is [`DebBuildError::Declined`] and nothing after it has run.
pub fn run_build_workflow(
    args: BuildWorkflowArgs,
    config: Config,
    deps: &Collaborators<'_>,
) -> Result<WorkflowResult> {
    let use_sudo = config.build.use_sudo;

    ui::display_header("Checking tools");
    toolchain::ensure_git(deps.tools, deps.runner, deps.decisions, use_sudo)?;
    toolchain::ensure_packaging_tools(deps.tools, deps.runner, deps.decisions, &config.build)?;

    let branch = select_branch(&config, deps.decisions)?;
    let context = BuildContext {
        work_dir: args.work_dir,
        config,
        branch,
        build_tag: args.build_tag,
    };
    info!(
        branch = context.branch.name(),
        next = context.branch.is_next(),
        tag = %context.build_tag,
        work_dir = %context.work_dir.display(),
        "starting build"
    );

    ui::display_header(&format!("Preparing source ({})", context.branch.name()));
    let tree = source::prepare_source(
        deps.runner,
        &context.config.source,
        &context.work_dir,
        &context.branch,
    )?;
    if tree.freshly_cloned() {
        ui::display_success(&format!("Cloned into {}", tree.path().display()));
    }

    ui::display_header("Versioning");
    let plan = plan_release(deps, &context, &tree)?;

    ui::display_header("Patching");
    let patches = patch_tree(deps, &context, &tree)?;

    ui::display_header("Building");
    toolchain::install_build_deps(deps.runner, deps.decisions, tree.path(), use_sudo)?;
    deps.runner.run_checked(&build_command(&context, &tree)?)?;
    ui::display_success("Build finished");

    let output_dir = tree.output_dir();
    let found = artifacts::locate(output_dir, &context.build_tag)?;
    let installed = install_artifacts(deps, &context, &found)?;

    let user_configs = if installed {
        offer_user_config(deps, args.home_dir.as_deref())?
    } else {
        Vec::new()
    };

    let removed = if Gate::Cleanup.ask(deps.decisions)? {
        artifacts::cleanup(output_dir, &context.build_tag)?
    } else {
        Vec::new()
    };

    Ok(WorkflowResult {
        branch: context.branch.name().to_string(),
        version: plan.package_version,
        build_tag: context.build_tag.to_string(),
        patches,
        artifacts: found,
        installed,
        user_configs,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_code;
    use crate::exec::{CommandOutput, FixedTools, MockRunner};
    use crate::ui::ScriptedDecisions;
    use git2::Repository;
    use std::fs;

    const TAG: &str = "20240101120000";

    fn init_source(work: &Path) -> PathBuf {
        init_source_at(work, "i3-gaps")
    }

    fn init_source_at(work: &Path, directory: &str) -> PathBuf {
        let src = work.join(directory);
        fs::create_dir_all(src.join("debian")).unwrap();
        fs::write(
            src.join("debian/changelog"),
            "i3-wm (4.18.1-1) unstable; urgency=medium\n",
        )
        .unwrap();
        fs::write(src.join("debian/rules"), "#!/usr/bin/make -f\n%:\n\tdh $@\n").unwrap();
        fs::write(src.join("I3_VERSION"), "4.18.2-non-git\n").unwrap();

        let repo = Repository::init(&src).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("I3_VERSION")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test", "test@localhost").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        src
    }

    fn args(work: &Path) -> BuildWorkflowArgs {
        BuildWorkflowArgs {
            work_dir: work.to_path_buf(),
            build_tag: BuildTag::parse(TAG).unwrap(),
            home_dir: None,
        }
    }

    #[test]
    fn test_declining_git_runs_nothing() {
        let work = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let tools = FixedTools::new(["dch", "dpkg-buildpackage", "patch"]);
        let decisions = ScriptedDecisions::new([false]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };

        let err = run_build_workflow(args(work.path()), Config::default(), &deps).unwrap_err();

        assert_eq!(err.exit_code(), exit_code::DECLINED_GIT);
        assert!(runner.calls().is_empty());
        assert_eq!(decisions.asked().len(), 1);
    }

    #[test]
    fn test_declining_packaging_tools() {
        let work = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let tools = FixedTools::new(["git"]);
        let decisions = ScriptedDecisions::new([false]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };

        let err = run_build_workflow(args(work.path()), Config::default(), &deps).unwrap_err();

        assert_eq!(err.exit_code(), exit_code::DECLINED_PACKAGING_TOOLS);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_full_run_on_existing_tree() {
        let work = tempfile::tempdir().unwrap();
        init_source(work.path());
        fs::create_dir(work.path().join("patches")).unwrap();
        fs::write(work.path().join("patches/0001-gaps.patch"), "--- a/x\n+++ b/x\n").unwrap();
        let deb = work
            .path()
            .join(format!("i3-wm_4.18.2-1gaps{}_amd64.deb", TAG));
        fs::write(&deb, b"").unwrap();

        let runner = MockRunner::new();
        let tools = FixedTools::all();
        // next branch: no; build deps, install, cleanup: yes
        let decisions = ScriptedDecisions::new([false, true, true, true]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };

        let result = run_build_workflow(args(work.path()), Config::default(), &deps).unwrap();

        assert_eq!(result.branch, "gaps");
        assert_eq!(result.version, format!("4.18.2-1gaps{}", TAG));
        assert_eq!(result.patches.len(), 1);
        assert_eq!(result.artifacts, vec![deb.clone()]);
        assert!(result.installed);
        assert_eq!(result.removed, vec![deb.clone()]);
        assert!(!deb.exists());

        let lines = runner.command_lines();
        assert!(!lines.iter().any(|l| l.starts_with("git clone")));
        assert_eq!(&lines[..2], &["git fetch origin", "git checkout gaps"]);
        assert!(lines[2].starts_with("dch --newversion 4.18.2-1gaps20240101120000"));
        assert!(runner.ran("dpkg-buildpackage"));
        assert_eq!(
            lines.last().unwrap(),
            &format!("sudo dpkg -i {}", deb.display())
        );

        let rules = fs::read_to_string(work.path().join("i3-gaps/debian/rules")).unwrap();
        assert!(rules.contains("override_dh_auto_test"));
    }

    #[test]
    fn test_next_branch_and_no_artifacts() {
        let work = tempfile::tempdir().unwrap();
        init_source(work.path());

        let runner = MockRunner::new();
        let tools = FixedTools::all();
        // next branch: yes; build deps: no; cleanup: no
        let decisions = ScriptedDecisions::new([true, false, false]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };

        let result = run_build_workflow(args(work.path()), Config::default(), &deps).unwrap();

        assert_eq!(result.branch, "gaps-next");
        assert!(result.artifacts.is_empty());
        assert!(!result.installed);
        assert!(result.removed.is_empty());
        assert!(!runner.ran("dpkg"));
        assert!(!runner.ran("apt-get"));
        // no install question without packages
        assert_eq!(decisions.asked().len(), 3);
    }

    #[test]
    fn test_nested_source_directory_finds_packages_next_to_tree() {
        let work = tempfile::tempdir().unwrap();
        init_source_at(work.path(), "build/i3-gaps");
        let deb = work
            .path()
            .join(format!("build/i3-wm_4.18.2-1gaps{}_amd64.deb", TAG));
        fs::write(&deb, b"").unwrap();
        let stray = work
            .path()
            .join(format!("i3-wm_4.18.2-1gaps{}_amd64.deb", TAG));
        fs::write(&stray, b"").unwrap();

        let runner = MockRunner::new();
        let tools = FixedTools::all();
        let decisions = ScriptedDecisions::new([false, false, true, true]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };
        let mut config = Config::default();
        config.source.directory = PathBuf::from("build/i3-gaps");

        let result = run_build_workflow(args(work.path()), config, &deps).unwrap();

        assert_eq!(result.artifacts, vec![deb.clone()]);
        assert!(result.installed);
        assert_eq!(result.removed, vec![deb.clone()]);
        assert!(stray.exists());
    }

    #[test]
    fn test_build_failure_is_fatal() {
        let work = tempfile::tempdir().unwrap();
        init_source(work.path());

        let runner = MockRunner::new();
        runner.respond("dpkg-buildpackage", CommandOutput::failure(2, "make: *** Error 1"));
        let tools = FixedTools::all();
        let decisions = ScriptedDecisions::new([false, false]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };

        let err = run_build_workflow(args(work.path()), Config::default(), &deps).unwrap_err();

        assert!(matches!(err, DebBuildError::CommandFailed { code: 2, .. }));
        assert_eq!(err.exit_code(), exit_code::FAILURE);
        assert!(!runner.ran("dpkg"));
    }

    #[test]
    fn test_user_config_offered_after_install() {
        let work = tempfile::tempdir().unwrap();
        init_source(work.path());
        fs::write(
            work.path().join(format!("i3_4.18.2-1gaps{}_all.deb", TAG)),
            b"",
        )
        .unwrap();
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".config/i3")).unwrap();
        let config_file = home.path().join(".config/i3/config");
        fs::write(&config_file, "").unwrap();

        let runner = MockRunner::new();
        let tools = FixedTools::all();
        let decisions = ScriptedDecisions::new([false, false, true, true, false]);
        let deps = Collaborators {
            runner: &runner,
            tools: &tools,
            decisions: &decisions,
        };
        let mut workflow_args = args(work.path());
        workflow_args.home_dir = Some(home.path().to_path_buf());

        let result = run_build_workflow(workflow_args, Config::default(), &deps).unwrap();

        assert_eq!(result.user_configs, vec![config_file.clone()]);
        assert!(fs::read_to_string(&config_file)
            .unwrap()
            .contains("gaps inner"));
    }
}
