use std::time::Duration;
use thiserror::Error;

/// Errors produced by the preload layer
///
/// Cancellation is not an error here: it comes back as a canceled outcome.
/// `StoreUninitialized` is a wiring defect and is propagated to the caller
/// instead of being recovered by the coordinator.
#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("preload failed for {path}: {message}")]
    Failed { path: String, message: String },

    #[error("preload for {path} timed out after {timeout:?}")]
    TimedOut { path: String, timeout: Duration },

    #[error("page data store read before it was provided")]
    StoreUninitialized,

    #[error("no navigation item registered for {0}")]
    UnknownRoute(String),

    #[error("duplicate navigation path in registry: {0}")]
    DuplicatePath(String),

    #[error("page data codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PreloadError>;
