use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::cancelable::CancelSignal;
use super::error::{PreloadError, Result};
use super::feedback::ProgressReporter;
use super::store::PageData;

/// Everything a preload operation is handed when it runs
pub struct PreloadContext {
    path: String,
    progress: ProgressReporter,
    signal: CancelSignal,
}

impl PreloadContext {
    pub fn new(path: impl Into<String>, progress: ProgressReporter, signal: CancelSignal) -> Self {
        Self {
            path: path.into(),
            progress,
            signal,
        }
    }

    /// Path of the page being preloaded
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Fires when the navigation that started this load is superseded.
    /// Observing it is optional: the result of a canceled load is ignored anyway.
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.signal
    }

    pub fn is_canceled(&self) -> bool {
        self.signal.is_canceled()
    }
}

/// Asynchronous work that fetches or prepares a page's data before it is shown
#[async_trait]
pub trait PreloadOperation: Send + Sync {
    async fn preload(&self, ctx: PreloadContext) -> anyhow::Result<PageData>;
}

/// Adapter turning a closure into a [`PreloadOperation`]
pub struct PreloadFn<F>(F);

#[async_trait]
impl<F, Fut> PreloadOperation for PreloadFn<F>
where
    F: Fn(PreloadContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<PageData>> + Send + 'static,
{
    async fn preload(&self, ctx: PreloadContext) -> anyhow::Result<PageData> {
        (self.0)(ctx).await
    }
}

/// Texts shown by the feedback channel while a page preloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackText {
    pub start_message: Option<String>,
    pub description: Option<String>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl FeedbackText {
    pub fn new(start_message: impl Into<String>) -> Self {
        Self {
            start_message: Some(start_message.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A route descriptor. Immutable once built.
#[derive(Clone)]
pub struct NavigationItem {
    path: String,
    title: String,
    preload: Option<Arc<dyn PreloadOperation>>,
    feedback: Option<FeedbackText>,
}

impl NavigationItem {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            preload: None,
            feedback: None,
        }
    }

    /// Preload with a closure returning a future
    pub fn with_preload<F, Fut>(self, preload: F) -> Self
    where
        F: Fn(PreloadContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<PageData>> + Send + 'static,
    {
        self.with_operation(PreloadFn(preload))
    }

    pub fn with_operation(mut self, operation: impl PreloadOperation + 'static) -> Self {
        self.preload = Some(Arc::new(operation));
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackText) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn preload_operation(&self) -> Option<&Arc<dyn PreloadOperation>> {
        self.preload.as_ref()
    }

    pub fn feedback(&self) -> Option<&FeedbackText> {
        self.feedback.as_ref()
    }

    pub fn has_preload(&self) -> bool {
        self.preload.is_some()
    }

    /// False for plain links that navigate straight away
    pub fn needs_coordination(&self) -> bool {
        self.preload.is_some() || self.feedback.is_some()
    }
}

impl fmt::Debug for NavigationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationItem")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("preload", &self.preload.is_some())
            .field("feedback", &self.feedback)
            .finish()
    }
}

/// Static table of navigation items, keyed by unique path
#[derive(Debug, Clone, Default)]
pub struct NavRegistry {
    items: Vec<NavigationItem>,
}

impl NavRegistry {
    pub fn new(items: Vec<NavigationItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.path()) {
                return Err(PreloadError::DuplicatePath(item.path().to_string()));
            }
        }
        Ok(Self { items })
    }

    pub fn find(&self, path: &str) -> Option<&NavigationItem> {
        self.items.iter().find(|item| item.path() == path)
    }

    /// Items in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &NavigationItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
