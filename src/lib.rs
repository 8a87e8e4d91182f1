pub mod config;
pub mod pages;
pub mod preload;
pub mod ui;

pub use config::PreloaderConfig;
pub use preload::{
    NavRegistry, NavigationItem, NavigationOutcome, PageDataStore, PreloadCoordinator,
    PreloadError, StoreProvider,
};
