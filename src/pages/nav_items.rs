use crate::preload::{FeedbackText, NavRegistry, NavigationItem, Result};

use super::interactive_map::{MapPreloadOptions, preload_interactive_map};

pub const HOME: &str = "/";
pub const INTERACTIVE_MAP: &str = "/interactive-map";
pub const ABOUT: &str = "/about";

/// The demo route table
pub fn nav_items(map_options: MapPreloadOptions) -> Result<NavRegistry> {
    NavRegistry::new(vec![
        NavigationItem::new(HOME, "Home"),
        NavigationItem::new(INTERACTIVE_MAP, "Interactive Map")
            .with_preload(move |ctx| preload_interactive_map(ctx, map_options))
            .with_feedback(
                FeedbackText::new("Loading Interactive Map...")
                    .with_description("Fetching map layers and assets."),
            ),
        NavigationItem::new(ABOUT, "About"),
    ])
}
