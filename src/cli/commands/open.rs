use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;

use page_preloader::config::PreloaderConfig;
use page_preloader::pages::{INTERACTIVE_MAP, MapData};
use page_preloader::preload::{MountOutcome, NavigationOutcome, PageMount, Resource};

use super::{MapArgs, demo_coordinator};

#[derive(Args)]
pub struct OpenCommands {
    /// Path of the page to open
    pub path: String,

    #[command(flatten)]
    pub map: MapArgs,
}

/// Mount a page with an empty store, letting it load itself
pub async fn open_command(args: OpenCommands, config: &PreloaderConfig) -> Result<()> {
    let (coordinator, _router) = demo_coordinator(config, &args.map, &args.path)?;
    info!("Opening {} directly", args.path);

    let mount = PageMount::new(&args.path);
    match mount.on_mount(&coordinator).await? {
        MountOutcome::Ready => println!("{} {} was already loaded", "✓".bright_green(), args.path),
        MountOutcome::NothingToLoad => println!("{} {} has nothing to preload", "✓".bright_green(), args.path),
        MountOutcome::AlreadyTriggered => println!("{} load already running", "…".dimmed()),
        MountOutcome::SelfLoaded(NavigationOutcome::Failed(err)) => {
            anyhow::bail!("{}", err);
        }
        MountOutcome::SelfLoaded(outcome) => {
            println!("{} {} ({:?})", "✓".bright_green(), args.path.cyan(), outcome);
        }
    }

    if args.path == INTERACTIVE_MAP {
        match coordinator.store()?.resource::<MapData>(&args.path) {
            Resource::Success(map) => {
                for line in map.summary_lines() {
                    println!("    {}", line);
                }
            }
            other => println!("    {}: {:?}", "Map data".dimmed(), other),
        }
    }

    Ok(())
}
