pub mod artifacts;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod gate;
pub mod patching;
pub mod source;
pub mod toolchain;
pub mod ui;
pub mod user_config;

pub use error::{DebBuildError, Result};
