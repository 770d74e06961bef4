//! Domain logic - versions, build tags and branch choice, independent of any tool

pub mod branch;
pub mod build_tag;
pub mod version;

pub use branch::BranchSelection;
pub use build_tag::BuildTag;
pub use version::{package_version, reconcile, DebVersion};
