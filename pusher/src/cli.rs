//! CLI argument definitions for toitnups.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! dispatch.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use toitnups::PreserveMode;

/// Push .NET integrations into a Unity project.
#[derive(Parser, Debug)]
#[command(name = "toitnups")]
#[command(version, about)]
#[command(long_about = concat!(
    "Push .NET integrations into a Unity project.\n\n",
    "An integration is a small class library that pulls in NuGet packages. ",
    "toitnups builds it with the dotnet CLI, copies the published assemblies ",
    "into the Unity Assets folder, and lists them in Assets/link.xml so the ",
    "IL2CPP linker keeps them.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Prepare a Unity project:\n",
    "    $ toitnups init\n\n",
    "  Register an integration copied to Assets/Plugins/Serilog:\n",
    "    $ toitnups add Serilog Plugins/Serilog\n\n",
    "  Build and copy every integration:\n",
    "    $ toitnups push\n\n",
    "  Push one integration with a different preserve mode:\n",
    "    $ toitnups push Serilog --preserve all\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Unity project directory [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub project: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prepare the Unity project for integrations.
    Init,

    /// Register and scaffold a new integration.
    Add(AddArgs),

    /// Remove an integration and its build project.
    Remove(RemoveArgs),

    /// Build integrations and copy their assemblies into Assets.
    Push(PushArgs),

    /// List registered integrations.
    List,
}

/// Arguments for the add command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Integration name, also used for the generated project.
    pub name: String,

    /// Destination folder relative to Assets.
    pub target_path: String,
}

/// Arguments for the remove command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct RemoveArgs {
    /// Integration to remove.
    pub name: String,
}

/// Arguments for the push command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct PushArgs {
    /// Push only this integration [default: all].
    pub name: Option<String>,

    /// Preserve mode for new link.xml entries [default: from config, else full].
    #[arg(long, value_name = "MODE")]
    pub preserve: Option<PreserveMode>,
}

impl Cli {
    /// Log level implied by `--quiet` and `--verbose`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use log::LevelFilter;
    /// use toitnups_pusher::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["toitnups", "-vv", "list"]);
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
