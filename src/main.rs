use anyhow::Result;
use clap::Parser;
use log::info;

use page_preloader::config::PreloaderConfig;

mod cli;

use cli::Cli;
use cli::Commands;
use cli::commands::{handle_simulate_command, init_config_command, open_command, routes_command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => PreloaderConfig::default_path()?,
    };
    let config = PreloaderConfig::load_from(&config_path)?;

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&config.log_file)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Starting page-preloader");

    match cli.command {
        Commands::Routes => routes_command().await,
        Commands::Simulate(args) => handle_simulate_command(args, &config).await,
        Commands::Open(args) => open_command(args, &config).await,
        Commands::InitConfig(args) => init_config_command(args, &config_path).await,
    }
}
