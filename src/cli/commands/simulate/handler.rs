//! Replays navbar clicks against the demo routes

use anyhow::Result;
use colored::*;
use futures::future::join_all;
use log::{info, warn};
use std::time::{Duration, Instant};

use page_preloader::config::PreloaderConfig;
use page_preloader::preload::{NavigationOutcome, PreloadError};

use super::super::demo_coordinator;
use super::SimulateCommands;

pub async fn handle_simulate_command(args: SimulateCommands, config: &PreloaderConfig) -> Result<()> {
    let (coordinator, router) = demo_coordinator(config, &args.map, &args.start)?;
    let gap = Duration::from_millis(args.gap_ms);
    let started = Instant::now();

    println!("🧭 {} {}", "Starting at".dimmed(), args.start.cyan());

    let mut clicks = Vec::with_capacity(args.paths.len());
    for (i, path) in args.paths.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(gap).await;
        }
        info!("Click {} -> {}", i + 1, path);

        let coordinator = coordinator.clone();
        let target = path.clone();
        clicks.push(tokio::spawn(async move { coordinator.navigate_to(&target).await }));
        // Let the click run up to its first await before the next one
        tokio::task::yield_now().await;
    }

    for (path, outcome) in args.paths.iter().zip(join_all(clicks).await) {
        print_outcome(path, outcome?);
    }

    println!();
    println!(
        "  {} {}",
        "Route history:".bright_white().bold(),
        router.history().join(" → ")
    );
    let store = coordinator.store()?;
    for item in coordinator.registry().iter().filter(|item| item.has_preload()) {
        let loaded = if store.is_loaded(item.path()) {
            "loaded".bright_green()
        } else {
            "not loaded".dimmed()
        };
        println!("  {} {}", item.path().cyan(), loaded);
    }
    println!("  {} {:.2?}", "Elapsed:".dimmed(), started.elapsed());

    Ok(())
}

fn print_outcome(path: &str, outcome: page_preloader::preload::Result<NavigationOutcome>) {
    match outcome {
        Ok(NavigationOutcome::Navigated { .. }) => {
            println!("  {} {}", "✓ navigated".bright_green(), path.cyan());
        }
        Ok(NavigationOutcome::Canceled { .. }) => {
            println!("  {} {}", "↷ superseded".yellow(), path.cyan());
        }
        Ok(NavigationOutcome::AlreadyThere { .. }) => {
            println!("  {} {}", "• already there".dimmed(), path.cyan());
        }
        Ok(NavigationOutcome::Failed(err)) => {
            println!("  {} {}: {}", "✗ failed".bright_red(), path.cyan(), err);
        }
        Ok(other) => println!("  {} {:?}", "•".dimmed(), other),
        Err(PreloadError::UnknownRoute(route)) => {
            warn!("Unknown route {}", route);
            println!("  {} {}", "✗ unknown route".bright_red(), route);
        }
        Err(err) => println!("  {} {}: {}", "✗ error".bright_red(), path.cyan(), err),
    }
}
