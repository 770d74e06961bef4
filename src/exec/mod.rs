//! External command abstraction layer
//!
//! Every tool the build drives (apt-get, git, patch, dch, dpkg-buildpackage,
//! dpkg) is invoked through the [CommandRunner] trait, so the orchestration
//! can run against real processes or against a recording mock.
//!
//! - [system::SystemRunner]: spawns real processes with `std::process`
//! - [mock::MockRunner]: records invocations and replays scripted results
//!
//! Tool presence is answered by a [ToolLocator]:
//!
//! - [system::WhichLocator]: searches `PATH` with the `which` crate
//! - [mock::FixedTools]: a fixed set of names, for tests

pub mod mock;
pub mod system;

pub use mock::{FixedTools, MockRunner};
pub use system::{SystemRunner, WhichLocator};

use crate::error::{DebBuildError, Result};
use std::path::{Path, PathBuf};

/// One external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// Capture stdout/stderr instead of streaming them to the terminal
    pub capture: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            capture: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Let the command write straight to the terminal (long builds, installs).
    pub fn streaming(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Run through `sudo` when `use_sudo` is set.
    pub fn privileged(self, use_sudo: bool) -> Self {
        if !use_sudo {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        CommandSpec {
            program: "sudo".to_string(),
            args,
            ..self
        }
    }

    /// The tool being run, looking through a `sudo` prefix.
    pub fn tool(&self) -> &str {
        if self.program == "sudo" {
            if let Some(first) = self.args.first() {
                return first;
            }
        }
        &self.program
    }

    /// Shell-like rendering for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; -1 when the process was killed by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands
///
/// `run` reports the exit status without judging it; callers that treat any
/// failure as fatal use [`CommandRunner::run_checked`].
pub trait CommandRunner {
    /// Run a command to completion
    ///
    /// # Returns
    /// * `Ok(CommandOutput)` - The process ran, whatever its exit code
    /// * `Err` - The process could not be started
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command and turn a non-zero exit into [`DebBuildError::CommandFailed`]
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(command = %spec.display(), "running");
        let output = self.run(spec)?;
        if !output.is_success() {
            return Err(DebBuildError::CommandFailed {
                command: spec.display(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Answers whether an executable is available
pub trait ToolLocator {
    fn is_available(&self, tool: &str) -> bool;

    /// The subset of `tools` that is not available, in input order
    fn missing<'a>(&self, tools: &'a [String]) -> Vec<&'a str> {
        tools
            .iter()
            .map(String::as_str)
            .filter(|tool| !self.is_available(tool))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_wraps_in_sudo() {
        let spec = CommandSpec::new("dpkg").args(["-i", "a.deb"]).privileged(true);
        assert_eq!(spec.program, "sudo");
        assert_eq!(spec.args, vec!["dpkg", "-i", "a.deb"]);
        assert_eq!(spec.tool(), "dpkg");
        assert_eq!(spec.display(), "sudo dpkg -i a.deb");
    }

    #[test]
    fn test_privileged_without_sudo() {
        let spec = CommandSpec::new("dpkg").arg("-i").privileged(false);
        assert_eq!(spec.program, "dpkg");
        assert_eq!(spec.tool(), "dpkg");
    }

    #[test]
    fn test_run_checked_maps_failure() {
        let runner = MockRunner::new();
        runner.respond("git", CommandOutput::failure(128, "fatal: not a repo\n"));

        let err = runner
            .run_checked(&CommandSpec::new("git").arg("status"))
            .unwrap_err();
        match err {
            DebBuildError::CommandFailed {
                command,
                code,
                stderr,
            } => {
                assert_eq!(command, "git status");
                assert_eq!(code, 128);
                assert_eq!(stderr, "fatal: not a repo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_tools() {
        let tools = FixedTools::new(["git", "patch"]);
        let wanted = vec!["git".to_string(), "dch".to_string(), "patch".to_string()];
        assert_eq!(tools.missing(&wanted), vec!["dch"]);
    }
}
