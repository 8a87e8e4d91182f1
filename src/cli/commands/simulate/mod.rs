pub mod handler;

pub use handler::handle_simulate_command;

use clap::Args;

use super::MapArgs;

#[derive(Args)]
pub struct SimulateCommands {
    /// Paths to click, in order
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Delay between clicks, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub gap_ms: u64,

    /// Path the router starts on
    #[arg(long, default_value = "/")]
    pub start: String,

    #[command(flatten)]
    pub map: MapArgs,
}
