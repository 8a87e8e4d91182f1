pub mod config;
pub mod open;
pub mod routes;
pub mod simulate;

pub use config::{InitConfigCommands, init_config_command};
pub use open::{OpenCommands, open_command};
pub use routes::routes_command;
pub use simulate::{SimulateCommands, handle_simulate_command};

use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use page_preloader::config::PreloaderConfig;
use page_preloader::pages::{MapPreloadOptions, nav_items};
use page_preloader::preload::{MemoryRouter, PageDataStore, PreloadCoordinator, StoreProvider};
use page_preloader::ui::TerminalFeedback;

/// How the simulated map preload behaves
#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    /// Time spent fetching map layers, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub latency_ms: u64,

    /// Time spent fetching the map image, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub image_latency_ms: u64,

    /// Make the map image fetch fail
    #[arg(long)]
    pub fail_map: bool,
}

impl MapArgs {
    pub fn options(&self) -> MapPreloadOptions {
        MapPreloadOptions {
            latency: Duration::from_millis(self.latency_ms),
            image_latency: Duration::from_millis(self.image_latency_ms),
            fail: self.fail_map,
        }
    }
}

/// A coordinator over the demo routes, with a fresh store and a memory router at `start`
pub fn demo_coordinator(
    config: &PreloaderConfig,
    map: &MapArgs,
    start: &str,
) -> anyhow::Result<(PreloadCoordinator, Arc<MemoryRouter>)> {
    let router = Arc::new(MemoryRouter::new(start));
    let coordinator = PreloadCoordinator::new(
        nav_items(map.options())?,
        StoreProvider::provided(PageDataStore::new()),
        router.clone(),
        Arc::new(TerminalFeedback::new()),
        config.clone(),
    );
    Ok((coordinator, router))
}
