use thiserror::Error;

use crate::gate::Gate;

/// Unified error type for i3-gaps-deb operations
#[derive(Error, Debug)]
pub enum DebBuildError {
    #[error("Declined required step: {}", .0.prompt())]
    Declined(Gate),

    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Source tree error: {0}")]
    Source(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in i3-gaps-deb
pub type Result<T> = std::result::Result<T, DebBuildError>;

impl DebBuildError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DebBuildError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        DebBuildError::Version(msg.into())
    }

    /// Create a source tree error with context
    pub fn source_tree(msg: impl Into<String>) -> Self {
        DebBuildError::Source(msg.into())
    }

    /// Process exit status for this error at the top-level run boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            DebBuildError::Declined(gate) => gate.decline_exit_code(),
            _ => crate::cli::exit_code::FAILURE,
        }
    }
}
