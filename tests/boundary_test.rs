use std::path::PathBuf;

use i3_gaps_deb::boundary::BoundaryWarning;
use i3_gaps_deb::ui;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_source_tree_exists_display() {
    let warning = BoundaryWarning::SourceTreeExists {
        path: PathBuf::from("/build/i3-gaps"),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("/build/i3-gaps"),
        "Message should name the tree, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("skipping clone"),
        "Message should say the clone is skipped, got: {}",
        display_msg
    );
}

#[test]
fn test_no_version_sources_mentions_fallback() {
    let display_msg = BoundaryWarning::NoVersionSources.to_string();
    assert!(
        display_msg.contains("0.0.0"),
        "Message should name the fallback version, got: {}",
        display_msg
    );
}

#[test]
fn test_patch_already_applied_display() {
    let warning = BoundaryWarning::PatchAlreadyApplied {
        patch: "0001-gaps.patch".to_string(),
    };
    assert_eq!(
        warning.to_string(),
        "Patch '0001-gaps.patch' is already applied, skipping"
    );
}

#[test]
fn test_no_artifacts_names_build_tag() {
    let warning = BoundaryWarning::NoArtifacts {
        build_tag: "20240101000000".to_string(),
    };
    assert!(warning.to_string().contains("20240101000000"));
}

#[test]
fn test_version_source_missing_names_source() {
    let warning = BoundaryWarning::VersionSourceMissing {
        source: "i3-gaps/I3_VERSION".to_string(),
    };
    assert!(warning.to_string().contains("i3-gaps/I3_VERSION"));
}

// ============================================================================
// Display function smoke tests
// ============================================================================

#[test]
fn test_display_every_warning() {
    let warnings = vec![
        BoundaryWarning::SourceTreeExists {
            path: PathBuf::from("i3-gaps"),
        },
        BoundaryWarning::VersionSourceMissing {
            source: "debian/changelog".to_string(),
        },
        BoundaryWarning::NoVersionSources,
        BoundaryWarning::PatchAlreadyApplied {
            patch: "a.patch".to_string(),
        },
        BoundaryWarning::PatchDirectoryMissing {
            path: PathBuf::from("patches"),
        },
        BoundaryWarning::NoArtifacts {
            build_tag: "20240101000000".to_string(),
        },
        BoundaryWarning::UserConfigNotWritable {
            path: PathBuf::from("/home/user/.config/i3/config"),
        },
    ];

    for warning in &warnings {
        assert!(!warning.to_string().is_empty());
        ui::display_boundary_warning(warning);
    }
}
