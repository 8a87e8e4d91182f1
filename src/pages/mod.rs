//! Demo pages and the route table wiring them to their preloads

pub mod interactive_map;
pub mod nav_items;

pub use interactive_map::{MapData, MapLayer, MapPreloadOptions, PointOfInterest};
pub use nav_items::{ABOUT, HOME, INTERACTIVE_MAP, nav_items};
