use std::sync::atomic::AtomicBool;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::flows;

#[derive(Parser, Debug)]
#[command(name = "bitforge")]
#[command(about = "FPGA toolchain driver and package manager", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the toolchain packages for this platform
    Packages {
        #[command(subcommand)]
        command: PackagesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PackagesCommand {
    /// Download and install packages (all of them when no name is given)
    Install {
        names: Vec<String>,
        /// Reinstall even when the installed version already matches
        #[arg(long)]
        force: bool,
    },
    /// Remove installed packages (all of them when no name is given)
    Uninstall { names: Vec<String> },
    /// Show the state of every package
    List,
    /// Remove broken installs, stale versions and orphan files
    Fix,
}

pub fn run_cli(cli: Cli, interrupt: &AtomicBool) -> Result<()> {
    match cli.command {
        Commands::Packages { command } => match command {
            PackagesCommand::Install { names, force } => {
                flows::run_install(&names, force, interrupt)
            }
            PackagesCommand::Uninstall { names } => flows::run_uninstall(&names),
            PackagesCommand::List => flows::run_list(),
            PackagesCommand::Fix => flows::run_fix(),
        },
    }
}
