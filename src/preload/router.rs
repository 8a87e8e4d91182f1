use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The host's router, as seen by the preload core
pub trait Router: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}

/// In-memory router keeping the full history of visited paths
#[derive(Debug)]
pub struct MemoryRouter {
    history: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial_path.into()]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every path visited, starting with the initial one
    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.lock().last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        debug!("Router - navigating to {}", path);
        self.lock().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_updates_current_path() {
        let router = MemoryRouter::default();
        assert_eq!(router.current_path(), "/");

        router.navigate("/interactive-map");

        assert_eq!(router.current_path(), "/interactive-map");
        assert_eq!(router.history(), vec!["/", "/interactive-map"]);
    }
}
