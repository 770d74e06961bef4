//! Command-line surface: argument parsing and exit codes.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::Parser;

pub mod orchestration;

/// Process exit statuses
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// The user declined to install git
    pub const DECLINED_GIT: i32 = 1;
    /// The user declined to install the packaging tools
    pub const DECLINED_PACKAGING_TOOLS: i32 = 2;
    pub const INVALID_ARGUMENT: i32 = 3;
    /// Any other failure: a command failed, I/O, bad settings
    pub const FAILURE: i32 = 4;
}

#[derive(Parser, Debug)]
#[command(
    name = "i3-gaps-deb",
    about = "Build and install Debian packages of i3-gaps from source",
    long_about = "Build and install Debian packages of i3-gaps from source.\n\n\
                  Run without arguments to clone (or reuse) the i3-gaps tree in the \
                  current directory, apply the patches from ./patches, build the \
                  packages and optionally install them."
)]
struct Args {
    #[arg(long, help = "Print the gaps settings for your i3 config and exit")]
    config: bool,
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Run the build
    Run,
    /// Print the gaps settings block
    PrintConfig,
    /// Print the rendered help text
    Help(String),
    /// Print the rendered usage error
    Invalid(String),
}

impl CliAction {
    /// Exit status for actions that end without a build
    pub fn exit_code(&self) -> i32 {
        match self {
            CliAction::Invalid(_) => exit_code::INVALID_ARGUMENT,
            _ => exit_code::SUCCESS,
        }
    }
}

/// Parse the command line (including the program name).
pub fn parse_args<I, T>(args: I) -> CliAction
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) if args.config => CliAction::PrintConfig,
        Ok(_) => CliAction::Run,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => CliAction::Help(e.to_string()),
        Err(e) => CliAction::Invalid(e.to_string()),
    }
}
