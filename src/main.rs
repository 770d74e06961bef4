use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use i3_gaps_deb::cli::orchestration::{
    run_build_workflow, BuildWorkflowArgs, Collaborators, WorkflowResult,
};
use i3_gaps_deb::cli::{self, exit_code, CliAction};
use i3_gaps_deb::config::{self, CONFIG_ENV_VAR};
use i3_gaps_deb::domain::BuildTag;
use i3_gaps_deb::exec::{SystemRunner, WhichLocator};
use i3_gaps_deb::ui::{self, AssumeDefaults, DecisionProvider, InteractivePrompt};
use i3_gaps_deb::user_config::GAPS_CONFIG;
use i3_gaps_deb::DebBuildError;

/// Answer every question with its default when set to `1`
const ASSUME_DEFAULTS_ENV_VAR: &str = "I3_GAPS_DEB_ASSUME_DEFAULTS";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let action = cli::parse_args(std::env::args_os());
    match &action {
        CliAction::Run => {}
        CliAction::PrintConfig => print!("{}", GAPS_CONFIG),
        CliAction::Help(text) => print!("{}", text),
        CliAction::Invalid(text) => eprint!("{}", text),
    }
    if action != CliAction::Run {
        process::exit(action.exit_code());
    }

    match run() {
        Ok(result) => {
            ui::display_summary(&result);
            process::exit(exit_code::SUCCESS);
        }
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            let code = e
                .downcast_ref::<DebBuildError>()
                .map_or(exit_code::FAILURE, DebBuildError::exit_code);
            process::exit(code);
        }
    }
}

fn run() -> Result<WorkflowResult> {
    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref()).context("Error loading config")?;

    let work_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let args = BuildWorkflowArgs {
        work_dir,
        build_tag: BuildTag::now(),
        home_dir: dirs::home_dir(),
    };

    let decisions: Box<dyn DecisionProvider> =
        if std::env::var(ASSUME_DEFAULTS_ENV_VAR).as_deref() == Ok("1") {
            Box::new(AssumeDefaults)
        } else {
            Box::new(InteractivePrompt)
        };
    let deps = Collaborators {
        runner: &SystemRunner,
        tools: &WhichLocator,
        decisions: decisions.as_ref(),
    };

    Ok(run_build_workflow(args, config, &deps)?)
}
