use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DebBuildError, Result};

/// File name looked up in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "i3-gaps-deb.toml";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "I3_GAPS_DEB_CONFIG";

/// Build rules appended to `debian/rules` after patching.
pub const DEFAULT_RULES_OVERRIDES: &str = "
# i3-gaps-deb overrides
override_dh_auto_test:
\t@echo \"i3-gaps-deb: skipping upstream test suite\"
";

/// Represents the complete configuration for i3-gaps-deb.
///
/// Every section has defaults, so a partial or missing file is valid.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub patches: PatchesConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

fn default_repository() -> String {
    "https://github.com/Airblader/i3.git".to_string()
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("i3-gaps")
}

fn default_stable_branch() -> String {
    "gaps".to_string()
}

fn default_next_branch() -> String {
    "gaps-next".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Where the upstream source comes from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Clone location, relative to the work directory
    #[serde(default = "default_source_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_stable_branch")]
    pub stable_branch: String,

    #[serde(default = "default_next_branch")]
    pub next_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Reset an existing tree to the remote branch head before building
    #[serde(default)]
    pub reset_hard: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            repository: default_repository(),
            directory: default_source_directory(),
            stable_branch: default_stable_branch(),
            next_branch: default_next_branch(),
            remote: default_remote(),
            reset_hard: false,
        }
    }
}

fn default_build_suffix() -> String {
    "1gaps".to_string()
}

fn default_maintainer_name() -> String {
    "i3-gaps-deb".to_string()
}

fn default_maintainer_email() -> String {
    "i3-gaps-deb@localhost".to_string()
}

fn default_distribution() -> String {
    "unstable".to_string()
}

fn default_changelog_message() -> String {
    "New upstream release.".to_string()
}

fn default_marker_file() -> PathBuf {
    PathBuf::from("I3_VERSION")
}

/// Versioning and changelog authorship for built packages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackageConfig {
    /// Text between the upstream version and the build tag
    #[serde(default = "default_build_suffix")]
    pub build_suffix: String,

    #[serde(default = "default_maintainer_name")]
    pub maintainer_name: String,

    #[serde(default = "default_maintainer_email")]
    pub maintainer_email: String,

    #[serde(default = "default_distribution")]
    pub distribution: String,

    #[serde(default = "default_changelog_message")]
    pub changelog_message: String,

    /// Upstream version marker, relative to the source tree
    #[serde(default = "default_marker_file")]
    pub marker_file: PathBuf,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            build_suffix: default_build_suffix(),
            maintainer_name: default_maintainer_name(),
            maintainer_email: default_maintainer_email(),
            distribution: default_distribution(),
            changelog_message: default_changelog_message(),
            marker_file: default_marker_file(),
        }
    }
}

fn default_patch_directory() -> PathBuf {
    PathBuf::from("patches")
}

fn default_rules_overrides() -> String {
    DEFAULT_RULES_OVERRIDES.to_string()
}

/// Patch set applied before the build.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatchesConfig {
    /// Patches directory, relative to the work directory
    #[serde(default = "default_patch_directory")]
    pub directory: PathBuf,

    /// Explicit application order. When unset, every `*.patch` file in
    /// `directory` is applied in file name order.
    #[serde(default)]
    pub files: Option<Vec<String>>,

    #[serde(default = "default_rules_overrides")]
    pub rules_overrides: String,
}

impl Default for PatchesConfig {
    fn default() -> Self {
        PatchesConfig {
            directory: default_patch_directory(),
            files: None,
            rules_overrides: default_rules_overrides(),
        }
    }
}

fn default_build_command() -> Vec<String> {
    vec![
        "dpkg-buildpackage".to_string(),
        "-us".to_string(),
        "-uc".to_string(),
        "-b".to_string(),
    ]
}

fn default_use_sudo() -> bool {
    true
}

fn default_packaging_tools() -> Vec<String> {
    vec![
        "dch".to_string(),
        "dpkg-buildpackage".to_string(),
        "patch".to_string(),
    ]
}

fn default_packaging_packages() -> Vec<String> {
    vec![
        "devscripts".to_string(),
        "dpkg-dev".to_string(),
        "build-essential".to_string(),
        "patch".to_string(),
    ]
}

/// How packages are built and installed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    /// Build command run inside the source tree
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,

    /// Prefix privileged commands (apt-get, dpkg -i) with sudo
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// Executables that must be on PATH before building
    #[serde(default = "default_packaging_tools")]
    pub packaging_tools: Vec<String>,

    /// Packages installed when any packaging tool is missing
    #[serde(default = "default_packaging_packages")]
    pub packaging_packages: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            use_sudo: default_use_sudo(),
            packaging_tools: default_packaging_tools(),
            packaging_packages: default_packaging_packages(),
        }
    }
}

impl Config {
    /// Reject settings the workflow cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.build.command.is_empty() {
            return Err(DebBuildError::config("build.command must not be empty"));
        }
        if self.source.stable_branch == self.source.next_branch {
            return Err(DebBuildError::config(format!(
                "source.stable_branch and source.next_branch are both '{}'",
                self.source.stable_branch
            )));
        }
        if self.package.build_suffix.contains(char::is_whitespace) {
            return Err(DebBuildError::config(
                "package.build_suffix must not contain whitespace",
            ));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `i3-gaps-deb.toml` in current directory
/// 3. `i3-gaps-deb.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        Some(PathBuf::from(CONFIG_FILE_NAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    };

    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            let content = fs::read_to_string(&path).map_err(|e| {
                DebBuildError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str(&content).map_err(|e| {
                DebBuildError::config(format!("Cannot parse {}: {}", path.display(), e))
            })?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}
