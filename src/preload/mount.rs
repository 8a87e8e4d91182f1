//! Self-trigger for pages reached without a preceding preload
//!
//! A page that is mounted directly (deep link, refresh) finds nothing in the
//! store and starts its own preload, at most once per mount. The load goes
//! through the coordinator like any other intent, so a later navigation
//! still supersedes it, and through the store's in-flight guard, so a
//! navbar preload already running for the same path is joined rather than
//! repeated.

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};

use super::coordinator::{NavigationOutcome, PreloadCoordinator};
use super::error::{PreloadError, Result};

#[derive(Debug)]
pub enum MountOutcome {
    /// Data was already in the store
    Ready,

    /// The page has no preload operation; mounting it leaves the coordinator alone
    NothingToLoad,

    /// This mount already triggered its load
    AlreadyTriggered,

    /// The page started (or joined) its own load
    SelfLoaded(NavigationOutcome),
}

impl MountOutcome {
    /// True if the page can render without waiting
    pub fn is_ready(&self) -> bool {
        matches!(self, MountOutcome::Ready | MountOutcome::NothingToLoad)
    }
}

/// One mount of a page at `path`
///
/// Create a new one for each mount; the trigger flag lives as long as it does.
#[derive(Debug)]
pub struct PageMount {
    path: String,
    triggered: AtomicBool,
}

impl PageMount {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            triggered: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Run on every render of the page
    pub async fn on_mount(&self, coordinator: &PreloadCoordinator) -> Result<MountOutcome> {
        let store = coordinator.store()?;

        if store.is_loaded(&self.path) {
            return Ok(MountOutcome::Ready);
        }

        let item = coordinator
            .registry()
            .find(&self.path)
            .cloned()
            .ok_or_else(|| PreloadError::UnknownRoute(self.path.clone()))?;

        if !item.has_preload() {
            return Ok(MountOutcome::NothingToLoad);
        }

        if self.triggered.swap(true, Ordering::AcqRel) {
            return Ok(MountOutcome::AlreadyTriggered);
        }

        debug!("Mount - {} not loaded, triggering its own preload", self.path);
        let outcome = coordinator.preload_and_navigate(&item, false).await?;
        Ok(MountOutcome::SelfLoaded(outcome))
    }
}
