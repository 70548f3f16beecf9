use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vex", about = "Typed wrapper around the Vagrant CLI")]
pub struct Cli {
    /// Path to config file (default: ./vex.toml, then ~/.config/vex/vex.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create and start the machines
    Up,

    /// Gracefully shut down the machines
    Halt,

    /// Stop and delete the machines
    Destroy,

    /// Show the state of each machine
    Status,

    /// Show the installed Vagrant version
    Version,

    /// Run a command on the machine over SSH
    Ssh {
        /// Command to run in the guest
        command: String,
    },

    /// Manage Vagrant plugins
    Plugin {
        #[command(subcommand)]
        action: PluginCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List installed plugins
    List,

    /// Install a plugin
    Install {
        /// Plugin name or path to a gem
        name: String,

        /// Version constraint to install
        #[arg(long)]
        plugin_version: Option<String>,

        /// Install into the project instead of globally
        #[arg(long)]
        local: bool,
    },
}
