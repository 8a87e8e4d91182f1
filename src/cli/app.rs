use super::commands::{InitConfigCommands, OpenCommands, SimulateCommands};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "page-preloader")]
#[command(about = "Preload page data before navigating, cancelling stale loads")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered routes
    Routes,
    /// Replay a sequence of navbar clicks through the coordinator
    Simulate(SimulateCommands),
    /// Open a page directly, as after a reload or deep link
    Open(OpenCommands),
    /// Write a config file with the default settings
    InitConfig(InitConfigCommands),
}
