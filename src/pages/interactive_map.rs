//! Interactive map page data and its preload

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::preload::{PageData, PreloadContext};

const MAP_IMAGE: &str = "/range4.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
}

/// Everything the map page renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub layers: Vec<MapLayer>,
    pub pois: Vec<PointOfInterest>,
    /// Handle of the preloaded base image
    pub image: String,
}

impl MapData {
    /// One line per layer and point of interest, for terminal output
    pub fn summary_lines(&self) -> Vec<String> {
        let layers = self
            .layers
            .iter()
            .map(|layer| format!("layer {} ({}, {})", layer.name, layer.kind, layer.year));
        let pois = self
            .pois
            .iter()
            .map(|poi| format!("poi {} @ {:.2}, {:.2}", poi.title, poi.lat, poi.lng));
        layers
            .chain(pois)
            .chain(std::iter::once(format!("image {}", self.image)))
            .collect()
    }
}

/// Knobs for the simulated map load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPreloadOptions {
    /// Time spent fetching layers before the image
    pub latency: Duration,
    /// Time spent fetching the base image
    pub image_latency: Duration,
    /// Make the image fetch fail
    pub fail: bool,
}

impl Default for MapPreloadOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1000),
            image_latency: Duration::from_millis(200),
            fail: false,
        }
    }
}

async fn fetch_image(src: &str, latency: Duration, fail: bool) -> Result<String> {
    debug!("Fetching image {}", src);
    tokio::time::sleep(latency).await;
    if fail {
        anyhow::bail!("NetworkError: could not load {}", src);
    }
    Ok(src.to_string())
}

/// Fetch layers, points of interest and the base image for the map page
///
/// The fetch is never interrupted: once started it completes even if the
/// navigation that asked for it is superseded.
pub async fn preload_interactive_map(ctx: PreloadContext, options: MapPreloadOptions) -> Result<PageData> {
    info!("Preloading interactive map for {}", ctx.path());
    ctx.progress().set(0.2);

    tokio::time::sleep(options.latency).await;

    let image = fetch_image(MAP_IMAGE, options.image_latency, options.fail)
        .await
        .context("Failed to preload Interactive Map data")?;

    let data = MapData {
        layers: vec![
            MapLayer {
                name: "Grizzly Range".to_string(),
                kind: "Polygon".to_string(),
                year: 2021,
            },
            MapLayer {
                name: "Fire History".to_string(),
                kind: "Raster".to_string(),
                year: 2019,
            },
        ],
        pois: vec![PointOfInterest {
            title: "Grizzly Habitat".to_string(),
            lat: 51.05,
            lng: -114.07,
        }],
        image,
    };

    ctx.progress().set(1.0);
    Ok(PageData::encode(&data)?)
}
