//! Shared fixtures for the coordinator integration tests

#![allow(dead_code)]

use page_preloader::config::PreloaderConfig;
use page_preloader::preload::{
    FeedbackChannel, FeedbackText, MemoryRouter, NavRegistry, NavigationItem, PageData,
    PageDataStore, PreloadCoordinator, StoreProvider,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROOT: &str = "/";
pub const HOME: &str = "/home";
pub const MAP: &str = "/map";
pub const GALLERY: &str = "/gallery";
pub const BROKEN: &str = "/broken";
pub const SLOW_TOAST: &str = "/toast-only";

pub const MAP_DELAY: Duration = Duration::from_millis(2000);
pub const GALLERY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    Start(Option<String>),
    Update(f32),
    End,
    Error(String),
    Success(String),
}

/// Feedback channel that records every signal
#[derive(Default)]
pub struct RecordingFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, FeedbackEvent::Start(_)))
    }

    pub fn ends(&self) -> usize {
        self.count(|e| matches!(e, FeedbackEvent::End))
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Update(fraction) => Some(fraction),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&FeedbackEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: FeedbackEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl FeedbackChannel for RecordingFeedback {
    fn start(&self, message: Option<&str>, _description: Option<&str>) {
        self.push(FeedbackEvent::Start(message.map(str::to_string)));
    }

    fn update(&self, fraction: f32) {
        self.push(FeedbackEvent::Update(fraction));
    }

    fn end(&self) {
        self.push(FeedbackEvent::End);
    }

    fn report_error(&self, message: &str) {
        self.push(FeedbackEvent::Error(message.to_string()));
    }

    fn report_success(&self, message: &str) {
        self.push(FeedbackEvent::Success(message.to_string()));
    }
}

/// Routes used across the tests, with a counter of map preload invocations
pub fn registry(map_calls: Arc<AtomicUsize>) -> NavRegistry {
    NavRegistry::new(vec![
        NavigationItem::new(HOME, "Home"),
        NavigationItem::new(MAP, "Interactive Map")
            .with_preload(move |ctx| {
                let calls = map_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ctx.progress().set(0.5);
                    tokio::time::sleep(MAP_DELAY).await;
                    ctx.progress().set(1.0);
                    Ok(PageData::new(json!({
                        "layers": [{"name": "Grizzly Range", "type": "Polygon", "year": 2021}]
                    })))
                }
            })
            .with_feedback(
                FeedbackText::new("Loading Interactive Map...")
                    .with_description("Fetching map layers and assets."),
            ),
        NavigationItem::new(GALLERY, "Gallery").with_preload(|_ctx| async {
            tokio::time::sleep(GALLERY_DELAY).await;
            Ok(PageData::new(json!({"photos": 12})))
        }),
        NavigationItem::new(BROKEN, "Broken")
            .with_preload(|_ctx| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                anyhow::bail!("NetworkError")
            })
            .with_feedback(FeedbackText::new("Loading Broken...")),
        NavigationItem::new(SLOW_TOAST, "Toast Only").with_feedback(FeedbackText::new("Just a toast")),
    ])
    .unwrap()
}

pub struct Fixture {
    pub coordinator: PreloadCoordinator,
    pub router: Arc<MemoryRouter>,
    pub feedback: Arc<RecordingFeedback>,
    pub store: PageDataStore,
    pub map_calls: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(PreloaderConfig::default())
    }

    pub fn with_config(config: PreloaderConfig) -> Self {
        let store = PageDataStore::new();
        Self::build(config, StoreProvider::provided(store.clone()), store)
    }

    /// Coordinator whose store provider was never given a store
    pub fn without_store() -> Self {
        Self::build(PreloaderConfig::default(), StoreProvider::new(), PageDataStore::new())
    }

    fn build(config: PreloaderConfig, provider: StoreProvider, store: PageDataStore) -> Self {
        let map_calls = Arc::new(AtomicUsize::new(0));
        let router = Arc::new(MemoryRouter::new(ROOT));
        let feedback = Arc::new(RecordingFeedback::default());
        let coordinator = PreloadCoordinator::new(
            registry(map_calls.clone()),
            provider,
            router.clone(),
            feedback.clone(),
            config,
        );

        Self {
            coordinator,
            router,
            feedback,
            store,
            map_calls,
        }
    }

    pub fn item(&self, path: &str) -> NavigationItem {
        self.coordinator.registry().find(path).cloned().unwrap()
    }

    pub fn map_calls(&self) -> usize {
        self.map_calls.load(Ordering::SeqCst)
    }

    pub fn current_path(&self) -> String {
        use page_preloader::preload::Router;
        self.router.current_path()
    }
}
