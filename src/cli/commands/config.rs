use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;
use std::path::Path;

use page_preloader::config::PreloaderConfig;

#[derive(Args)]
pub struct InitConfigCommands {
    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}

pub async fn init_config_command(args: InitConfigCommands, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!("Config file already exists: {} (use --force to overwrite)", path.display());
    }

    info!("Writing default config to {:?}", path);
    PreloaderConfig::default().save_to(path)?;
    println!("{} Wrote {}", "✓".bright_green(), path.display().to_string().cyan());
    Ok(())
}
