//! The gaps settings block and its optional append to the user's i3 config.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::error::Result;
use crate::gate::Gate;
use crate::ui::{self, DecisionProvider};

/// Settings printed by `--config` and offered for the user's i3 config.
pub const GAPS_CONFIG: &str = "\
# i3-gaps: window gaps need borders drawn as pixels
for_window [class=\".*\"] border pixel 2

gaps inner 10
gaps outer 0

# Only show gaps and borders with more than one window on a workspace
smart_gaps on
smart_borders on
";

/// The two conventional i3 config locations under a home directory.
pub fn candidate_paths(home: &Path) -> [PathBuf; 2] {
    [home.join(".i3/config"), home.join(".config/i3/config")]
}

fn is_writable(path: &Path) -> bool {
    OpenOptions::new().append(true).open(path).is_ok()
}

/// Append the gaps block to one file.
pub fn append_gaps_config(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(b"\n")?;
    file.write_all(GAPS_CONFIG.as_bytes())?;
    info!(path = %path.display(), "appended gaps settings");
    Ok(())
}

/// Offer the append for every existing, writable config file.
///
/// Files that do not exist are skipped silently; existing read-only files
/// are reported. Returns the files that were changed.
pub fn offer_append(decisions: &dyn DecisionProvider, home: &Path) -> Result<Vec<PathBuf>> {
    let mut changed = Vec::new();

    for path in candidate_paths(home) {
        if !path.is_file() {
            continue;
        }
        if !is_writable(&path) {
            ui::display_boundary_warning(&BoundaryWarning::UserConfigNotWritable { path });
            continue;
        }
        if Gate::AppendUserConfig(path.clone()).ask(decisions)? {
            append_gaps_config(&path)?;
            changed.push(path);
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedDecisions;
    use std::fs;

    #[test]
    fn test_gaps_config_has_gaps_directives() {
        assert!(GAPS_CONFIG.contains("gaps inner"));
        assert!(GAPS_CONFIG.contains("gaps outer"));
    }

    #[test]
    fn test_candidate_paths() {
        let [legacy, xdg] = candidate_paths(Path::new("/home/user"));
        assert_eq!(legacy, PathBuf::from("/home/user/.i3/config"));
        assert_eq!(xdg, PathBuf::from("/home/user/.config/i3/config"));
    }

    #[test]
    fn test_offer_append_only_existing_files() {
        let home = tempfile::tempdir().unwrap();
        let xdg = home.path().join(".config/i3");
        fs::create_dir_all(&xdg).unwrap();
        fs::write(xdg.join("config"), "set $mod Mod4\n").unwrap();

        let decisions = ScriptedDecisions::new([true]);
        let changed = offer_append(&decisions, home.path()).unwrap();

        assert_eq!(changed, vec![xdg.join("config")]);
        assert_eq!(decisions.asked().len(), 1);
        let content = fs::read_to_string(xdg.join("config")).unwrap();
        assert!(content.starts_with("set $mod Mod4\n"));
        assert!(content.ends_with(GAPS_CONFIG));
    }

    #[test]
    fn test_offer_append_declined() {
        let home = tempfile::tempdir().unwrap();
        let legacy = home.path().join(".i3");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("config"), "").unwrap();

        let decisions = ScriptedDecisions::new([false]);
        let changed = offer_append(&decisions, home.path()).unwrap();

        assert!(changed.is_empty());
        assert_eq!(fs::read_to_string(legacy.join("config")).unwrap(), "");
    }
}
