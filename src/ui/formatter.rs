//! Formatting functions for UI output.
//!
//! All display logic lives here, separated from user interaction. Styling
//! goes through `console`, which drops colours when the stream is not a
//! terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::WorkflowResult;
use crate::patching::PatchOutcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a bold section header for a workflow step.
pub fn display_header(message: &str) {
    println!("\n{}", style(message).bold());
}

/// Display a boundary warning to the user.
///
/// Shows a yellow warning icon followed by the warning message.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the outcome of a completed run.
pub fn display_summary(result: &WorkflowResult) {
    println!("\n{}", style("Build summary:").bold());
    println!("  Branch:  {}", result.branch);
    println!("  Version: {}", style(&result.version).green());
    println!("  Tag:     {}", result.build_tag);

    let skipped = result
        .patches
        .iter()
        .filter(|(_, outcome)| *outcome == PatchOutcome::AlreadyApplied)
        .count();
    println!(
        "  Patches: {} ({} already applied)",
        result.patches.len(),
        skipped
    );

    if result.artifacts.is_empty() {
        println!("  Packages: none found");
    } else {
        println!("  Packages:");
        for artifact in &result.artifacts {
            println!("    - {}", artifact.display());
        }
    }

    println!(
        "  Installed: {}",
        if result.installed { "yes" } else { "no" }
    );

    for path in &result.user_configs {
        println!("  Gaps settings added to {}", path.display());
    }

    if !result.removed.is_empty() {
        println!("  Removed {} file(s)", result.removed.len());
    }
}
