use anyhow::Result;
use colored::*;

use page_preloader::pages::{MapPreloadOptions, nav_items};

/// Print the route table
pub async fn routes_command() -> Result<()> {
    let registry = nav_items(MapPreloadOptions::default())?;

    println!();
    println!("  {}", "Routes".bright_blue().bold());
    println!("  {}", "══════".bright_blue());

    for item in registry.iter() {
        let marker = if item.has_preload() {
            "⏳".to_string()
        } else {
            "→".dimmed().to_string()
        };
        println!("  {} {:<20} {}", marker, item.path().cyan(), item.title());
        if let Some(text) = item.feedback() {
            if let Some(message) = &text.start_message {
                println!("      {}: {}", "Feedback".dimmed(), message);
            }
        }
    }

    println!();
    Ok(())
}
