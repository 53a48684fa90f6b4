use clap::{Parser, Subcommand};

use crate::version::long_version;

/// LocalStack command-line interface.
#[derive(Debug, Parser)]
#[command(name = "lstk", version = long_version(), about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the configured emulators (the default).
    Start,
    /// Authenticate and store the token.
    Login,
    /// Remove the stored token.
    Logout,
    /// Stop the configured emulators.
    Stop,
    /// Show emulator logs.
    Logs {
        /// Keep streaming new lines.
        #[arg(short, long)]
        follow: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file in use.
    Path,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Start)
    }
}
