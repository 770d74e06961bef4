use crate::error::{DebBuildError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ToolLocator};
use std::process::{Command, Stdio};

/// Spawns real processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let spawn_error = |source| DebBuildError::CommandSpawn {
            command: spec.display(),
            source,
        };

        if spec.capture {
            let output = cmd.output().map_err(spawn_error)?;
            Ok(CommandOutput {
                code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            Ok(CommandOutput {
                code: status.code().unwrap_or(-1),
                ..CommandOutput::default()
            })
        }
    }
}

/// Looks tools up on `PATH`
#[derive(Debug, Default)]
pub struct WhichLocator;

impl ToolLocator for WhichLocator {
    fn is_available(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}
