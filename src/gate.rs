//! Yes/no decision points of a build run.
//!
//! Every gate carries its prompt text and default answer. Required gates end
//! the run when declined; the rest only skip their step.

use std::path::PathBuf;

use crate::cli::exit_code;
use crate::error::{DebBuildError, Result};
use crate::ui::DecisionProvider;

/// A yes/no decision point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Install git when it is missing (required)
    InstallGit,
    /// Install the Debian packaging tools when any is missing (required)
    InstallPackagingTools,
    /// Build from the next branch instead of the stable one
    UseNextBranch { stable: String, next: String },
    /// Install the build dependencies declared in debian/control
    InstallBuildDeps,
    /// Install the freshly built packages
    InstallPackages,
    /// Append the gaps configuration block to a user i3 config file
    AppendUserConfig(PathBuf),
    /// Remove the files produced by this run
    Cleanup,
}

impl Gate {
    /// Text shown to the user, without the answer hint.
    pub fn prompt(&self) -> String {
        match self {
            Gate::InstallGit => "git is not installed. Install it now?".to_string(),
            Gate::InstallPackagingTools => {
                "Debian packaging tools are missing. Install them now?".to_string()
            }
            Gate::UseNextBranch { stable, next } => format!(
                "Build from the '{}' branch instead of '{}'?",
                next, stable
            ),
            Gate::InstallBuildDeps => "Install build dependencies?".to_string(),
            Gate::InstallPackages => "Install the built packages?".to_string(),
            Gate::AppendUserConfig(path) => format!(
                "Append the gaps settings to {}?",
                path.display()
            ),
            Gate::Cleanup => "Remove the files produced by this build?".to_string(),
        }
    }

    /// Answer used when the user just presses Enter.
    pub fn default_answer(&self) -> bool {
        match self {
            Gate::InstallGit
            | Gate::InstallPackagingTools
            | Gate::InstallBuildDeps
            | Gate::InstallPackages => true,
            Gate::UseNextBranch { .. } | Gate::AppendUserConfig(_) | Gate::Cleanup => false,
        }
    }

    /// Whether declining this gate ends the run.
    pub fn is_required(&self) -> bool {
        matches!(self, Gate::InstallGit | Gate::InstallPackagingTools)
    }

    /// Exit status used when this gate is declined.
    pub fn decline_exit_code(&self) -> i32 {
        match self {
            Gate::InstallGit => exit_code::DECLINED_GIT,
            Gate::InstallPackagingTools => exit_code::DECLINED_PACKAGING_TOOLS,
            _ => exit_code::SUCCESS,
        }
    }

    /// Ask the decision provider about this gate.
    ///
    /// Returns the answer for optional gates. A declined required gate
    /// becomes [`DebBuildError::Declined`].
    pub fn ask(&self, decisions: &dyn DecisionProvider) -> Result<bool> {
        let accepted = decisions.confirm(&self.prompt(), self.default_answer())?;
        if !accepted && self.is_required() {
            return Err(DebBuildError::Declined(self.clone()));
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedDecisions;

    #[test]
    fn test_required_gates() {
        assert!(Gate::InstallGit.is_required());
        assert!(Gate::InstallPackagingTools.is_required());
        assert!(!Gate::InstallPackages.is_required());
        assert!(!Gate::Cleanup.is_required());
        assert!(!Gate::AppendUserConfig(PathBuf::from("/tmp/config")).is_required());
    }

    #[test]
    fn test_defaults() {
        assert!(Gate::InstallGit.default_answer());
        assert!(Gate::InstallPackages.default_answer());
        assert!(!Gate::Cleanup.default_answer());
        let branch = Gate::UseNextBranch {
            stable: "gaps".to_string(),
            next: "gaps-next".to_string(),
        };
        assert!(!branch.default_answer());
        assert!(branch.prompt().contains("gaps-next"));
    }

    #[test]
    fn test_declining_required_gate_is_an_error() {
        let decisions = ScriptedDecisions::new([false]);
        let err = Gate::InstallGit.ask(&decisions).unwrap_err();
        assert!(matches!(err, DebBuildError::Declined(Gate::InstallGit)));
        assert_eq!(err.exit_code(), exit_code::DECLINED_GIT);
    }

    #[test]
    fn test_declining_optional_gate_is_not_an_error() {
        let decisions = ScriptedDecisions::new([false]);
        assert!(!Gate::InstallPackages.ask(&decisions).unwrap());
    }

    #[test]
    fn test_exhausted_script_uses_default() {
        let decisions = ScriptedDecisions::new(Vec::<bool>::new());
        assert!(Gate::InstallBuildDeps.ask(&decisions).unwrap());
        assert!(!Gate::Cleanup.ask(&decisions).unwrap());
    }
}
