//! CLI module for a2a-probe.
//!
//! - Argument parsing
//! - Version and usage display
//! - Running a call and printing its output and statistics
//!
//! # Usage
//!
//! ```ignore
//! use a2a_probe::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! run_cli_command(command).await?;
//! ```

pub mod args;
pub mod run;
pub mod version;

pub use args::{parse_args, Action, ArgsError, CliCommand, RunOptions};
pub use run::run;
pub use version::{handle_help_command, handle_version_command, USAGE, VERSION};

use color_eyre::Result;

/// Run a CLI command.
///
/// `Version` and `Help` never return as they call `std::process::exit(0)`.
pub async fn run_cli_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => handle_help_command(),
        CliCommand::Run(options) => run(options).await,
    }
}
