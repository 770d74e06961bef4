use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met during a build run.
/// These are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The source tree is already present, so cloning is skipped
    SourceTreeExists { path: PathBuf },
    /// A version source could not be read or parsed
    VersionSourceMissing { source: String },
    /// Neither version source was usable; the build falls back to 0.0.0
    NoVersionSources,
    /// The patch tool reported the patch as already present in the tree
    PatchAlreadyApplied { patch: String },
    /// The configured patches directory does not exist
    PatchDirectoryMissing { path: PathBuf },
    /// The build finished but no artifacts carry the build tag
    NoArtifacts { build_tag: String },
    /// A user configuration file exists but cannot be written
    UserConfigNotWritable { path: PathBuf },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::SourceTreeExists { path } => {
                write!(
                    f,
                    "Source tree '{}' already exists, skipping clone",
                    path.display()
                )
            }
            BoundaryWarning::VersionSourceMissing { source } => {
                write!(f, "No usable version found in {}", source)
            }
            BoundaryWarning::NoVersionSources => {
                write!(f, "No version source available, falling back to 0.0.0")
            }
            BoundaryWarning::PatchAlreadyApplied { patch } => {
                write!(f, "Patch '{}' is already applied, skipping", patch)
            }
            BoundaryWarning::PatchDirectoryMissing { path } => {
                write!(
                    f,
                    "Patch directory '{}' not found, no patches applied",
                    path.display()
                )
            }
            BoundaryWarning::NoArtifacts { build_tag } => {
                write!(f, "No packages found for build tag '{}'", build_tag)
            }
            BoundaryWarning::UserConfigNotWritable { path } => {
                write!(f, "Cannot write to '{}', skipping", path.display())
            }
        }
    }
}
