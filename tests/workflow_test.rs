// tests/workflow_test.rs
use std::fs;

use i3_gaps_deb::cli::exit_code;
use i3_gaps_deb::cli::orchestration::{run_build_workflow, BuildWorkflowArgs, Collaborators};
use i3_gaps_deb::config::Config;
use i3_gaps_deb::domain::BuildTag;
use i3_gaps_deb::exec::{CommandOutput, FixedTools, MockRunner};
use i3_gaps_deb::ui::ScriptedDecisions;
use i3_gaps_deb::DebBuildError;

fn workflow_args(work: &std::path::Path) -> BuildWorkflowArgs {
    BuildWorkflowArgs {
        work_dir: work.to_path_buf(),
        build_tag: BuildTag::parse("20240305101500").unwrap(),
        home_dir: None,
    }
}

#[test]
fn test_missing_tools_are_installed_before_anything_else() {
    let work = tempfile::tempdir().unwrap();
    let runner = MockRunner::new();
    runner.respond("git", CommandOutput::failure(128, "fatal: unable to access"));
    let tools = FixedTools::default();
    // git: yes, packaging tools: yes, next branch: no
    let decisions = ScriptedDecisions::new([true, true, false]);
    let deps = Collaborators {
        runner: &runner,
        tools: &tools,
        decisions: &decisions,
    };

    let err = run_build_workflow(workflow_args(work.path()), Config::default(), &deps).unwrap_err();

    let lines = runner.command_lines();
    assert_eq!(lines[0], "sudo apt-get install -y git");
    assert_eq!(
        lines[1],
        "sudo apt-get install -y devscripts dpkg-dev build-essential patch"
    );
    assert!(lines[2].starts_with("git clone --branch gaps https://github.com/Airblader/i3.git"));
    assert!(matches!(err, DebBuildError::CommandFailed { code: 128, .. }));
    assert_eq!(err.exit_code(), exit_code::FAILURE);
}

#[test]
fn test_clone_uses_configured_branch_and_directory() {
    let work = tempfile::tempdir().unwrap();
    let runner = MockRunner::new();
    runner.respond("git", CommandOutput::failure(1, "stop here"));
    let tools = FixedTools::all();
    let decisions = ScriptedDecisions::new([true]);
    let deps = Collaborators {
        runner: &runner,
        tools: &tools,
        decisions: &decisions,
    };
    let mut config = Config::default();
    config.source.next_branch = "gaps-experimental".to_string();
    config.source.directory = "src-tree".into();

    let _ = run_build_workflow(workflow_args(work.path()), config, &deps);

    let clone = &runner.calls_to("git")[0];
    assert_eq!(&clone.args[..3], &["clone", "--branch", "gaps-experimental"]);
    assert_eq!(
        clone.args.last().unwrap(),
        &work.path().join("src-tree").to_string_lossy().into_owned()
    );
}

#[test]
fn test_existing_directory_that_is_not_a_repository() {
    let work = tempfile::tempdir().unwrap();
    fs::create_dir(work.path().join("i3-gaps")).unwrap();
    let runner = MockRunner::new();
    let tools = FixedTools::all();
    let decisions = ScriptedDecisions::new([false]);
    let deps = Collaborators {
        runner: &runner,
        tools: &tools,
        decisions: &decisions,
    };

    let err = run_build_workflow(workflow_args(work.path()), Config::default(), &deps).unwrap_err();

    assert!(matches!(err, DebBuildError::Source(_)));
    assert!(runner.calls().is_empty());
}
