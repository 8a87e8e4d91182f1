//! Preload coordinator
//!
//! The single authority for "what is currently loading". Each navigation
//! intent cancels the previous one (last intent wins, nothing is queued),
//! starts the item's preload inside a [`CancelableTask`] and, once that task
//! settles without being superseded, commits the data and navigates.
//!
//! The active slot belongs to one coordinator instance. Independent
//! coordinators (one per session, or one per test) never see each other.

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use super::cancelable::{CancelHandle, CancelableTask, Settled, TaskId};
use super::error::{PreloadError, Result};
use super::feedback::{FeedbackChannel, ProgressReporter};
use super::registry::{FeedbackText, NavRegistry, NavigationItem, PreloadContext};
use super::router::Router;
use super::store::{LoadTicket, PageData, PageDataStore, StoreProvider};
use crate::config::PreloaderConfig;

/// How a navigation intent ended
#[derive(Debug)]
pub enum NavigationOutcome {
    /// Data (if any) committed and the router moved to `path`
    Navigated { path: String },

    /// Data committed, navigation was not requested (self-triggered loads)
    Loaded { path: String },

    /// Plain item without preload and navigation not requested: nothing to do
    Skipped { path: String },

    /// The router already shows `path`
    AlreadyThere { path: String },

    /// Superseded by a later intent; store and router untouched
    Canceled { path: String },

    /// Preload failed or timed out; already reported through feedback
    Failed(PreloadError),
}

impl NavigationOutcome {
    pub fn is_navigated(&self) -> bool {
        matches!(self, NavigationOutcome::Navigated { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, NavigationOutcome::Canceled { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, NavigationOutcome::Failed(_))
    }

    /// True if the store received data for the path
    pub fn committed(&self) -> bool {
        matches!(self, NavigationOutcome::Navigated { .. } | NavigationOutcome::Loaded { .. })
    }
}

/// Identity of the load currently occupying the active slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTaskInfo {
    pub id: TaskId,
    pub path: String,
}

struct ActiveTask {
    id: TaskId,
    path: String,
    handle: CancelHandle,
}

struct Shared {
    registry: NavRegistry,
    store: StoreProvider,
    router: Arc<dyn Router>,
    feedback: Arc<dyn FeedbackChannel>,
    config: PreloaderConfig,
    slot: Mutex<Option<ActiveTask>>,
    open_sessions: Mutex<usize>,
    loading: watch::Sender<bool>,
}

impl Shared {
    fn lock_slot(&self) -> MutexGuard<'_, Option<ActiveTask>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the slot if `id` still owns it. Returns whether it did.
    fn release_slot(&self, id: TaskId) -> bool {
        let mut slot = self.lock_slot();
        if slot.as_ref().is_some_and(|active| active.id == id) {
            *slot = None;
            debug!("Coordinator - slot released by task {}", id);
            true
        } else {
            false
        }
    }
}

/// Start/end pairing for one coordinated navigation
///
/// `end()` runs from `Drop`, so it fires on every exit path, including a
/// `Navigation` that is dropped before being finished.
struct FeedbackSession {
    shared: Arc<Shared>,
}

impl FeedbackSession {
    fn open(shared: &Arc<Shared>, message: Option<&str>, description: Option<&str>) -> Self {
        shared.feedback.start(message, description);
        let mut open = shared.open_sessions.lock().unwrap_or_else(PoisonError::into_inner);
        *open += 1;
        shared.loading.send_replace(true);
        Self {
            shared: shared.clone(),
        }
    }
}

impl Drop for FeedbackSession {
    fn drop(&mut self) {
        self.shared.feedback.end();
        let mut open = self
            .shared
            .open_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *open = open.saturating_sub(1);
        if *open == 0 {
            self.shared.loading.send_replace(false);
        }
    }
}

enum NavigationState {
    Done(NavigationOutcome),
    Pending {
        task: CancelableTask<Option<PageData>>,
        session: FeedbackSession,
    },
}

/// A navigation intent that has been started
///
/// Cancellation of the previous intent, the feedback start and the preload
/// itself already happened when this was created; [`finish`](Navigation::finish)
/// waits for the outcome and applies it.
#[must_use = "a navigation only commits and navigates once finished"]
pub struct Navigation {
    shared: Arc<Shared>,
    path: String,
    title: String,
    feedback_text: Option<FeedbackText>,
    should_navigate: bool,
    state: NavigationState,
}

impl Navigation {
    fn done(shared: &Arc<Shared>, item: &NavigationItem, outcome: NavigationOutcome) -> Self {
        Self {
            shared: shared.clone(),
            path: item.path().to_string(),
            title: item.title().to_string(),
            feedback_text: item.feedback().cloned(),
            should_navigate: false,
            state: NavigationState::Done(outcome),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Id of the preload task, if this intent started one
    pub fn task_id(&self) -> Option<TaskId> {
        match &self.state {
            NavigationState::Pending { task, .. } => Some(task.id()),
            NavigationState::Done(_) => None,
        }
    }

    pub async fn finish(self) -> NavigationOutcome {
        let Navigation {
            shared,
            path,
            title,
            feedback_text,
            should_navigate,
            state,
        } = self;

        let (task, session) = match state {
            NavigationState::Done(outcome) => return outcome,
            NavigationState::Pending { task, session } => (task, session),
        };

        let id = task.id();
        let handle = task.handle();
        let settled = match shared.config.preload_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, task.settle()).await {
                Ok(settled) => Some(settled),
                Err(_) => {
                    warn!("Preload for {} timed out after {:?}", path, timeout);
                    handle.cancel();
                    None
                }
            },
            None => Some(task.settle().await),
        };

        let outcome = match settled {
            Some(Settled::Ok(data)) => apply(
                &shared,
                id,
                &path,
                &title,
                feedback_text.as_ref(),
                data,
                should_navigate,
            ),
            Some(Settled::Canceled) => {
                shared.release_slot(id);
                info!("Preload cancelled for {}", path);
                NavigationOutcome::Canceled { path }
            }
            Some(Settled::Failed(err)) => {
                let err = PreloadError::Failed {
                    path: path.clone(),
                    message: format!("{:#}", err),
                };
                fail(&shared, id, path, &title, feedback_text.as_ref(), err)
            }
            None => {
                let err = PreloadError::TimedOut {
                    path: path.clone(),
                    timeout: shared.config.preload_timeout().unwrap_or_default(),
                };
                fail(&shared, id, path, &title, feedback_text.as_ref(), err)
            }
        };

        drop(session);
        outcome
    }
}

/// Commit and navigate for a settled task that still owns the slot
fn apply(
    shared: &Arc<Shared>,
    id: TaskId,
    path: &str,
    title: &str,
    feedback_text: Option<&FeedbackText>,
    data: Option<PageData>,
    should_navigate: bool,
) -> NavigationOutcome {
    {
        let mut slot = shared.lock_slot();
        let current = slot
            .as_ref()
            .is_some_and(|active| active.id == id && !active.handle.is_canceled());
        if !current {
            warn!("Ignoring stale preload result for {} (task {})", path, id);
            return NavigationOutcome::Canceled {
                path: path.to_string(),
            };
        }
        *slot = None;
    }
    // Slot lock released before calling out, so a router reacting to the
    // navigation can start the next intent.

    if let Some(data) = data {
        match shared.store.get() {
            Ok(store) => store.commit(path, data),
            Err(err) => return NavigationOutcome::Failed(err),
        }
    }

    if let Some(text) = feedback_text {
        shared
            .feedback
            .report_success(&shared.config.success_message(title, Some(text)));
    }

    if should_navigate {
        info!("✓ Preload complete, navigating to {}", path);
        shared.router.navigate(path);
        NavigationOutcome::Navigated {
            path: path.to_string(),
        }
    } else {
        info!("✓ Preload complete for {} (no navigation requested)", path);
        NavigationOutcome::Loaded {
            path: path.to_string(),
        }
    }
}

fn fail(
    shared: &Arc<Shared>,
    id: TaskId,
    path: String,
    title: &str,
    feedback_text: Option<&FeedbackText>,
    err: PreloadError,
) -> NavigationOutcome {
    if !shared.release_slot(id) {
        // Superseded between settling and getting here
        info!("Preload for {} failed after being superseded, ignoring", path);
        return NavigationOutcome::Canceled { path };
    }

    let message = match &err {
        PreloadError::Failed { message, .. } => message.clone(),
        other => other.to_string(),
    };
    error!("Preloading failed for {}: {}", path, message);
    if let Ok(store) = shared.store.get() {
        store.record_failure(&path, &message);
    }
    shared
        .feedback
        .report_error(&shared.config.error_message(title, feedback_text));

    NavigationOutcome::Failed(err)
}

/// Coordinates preloads and route transitions for one session
#[derive(Clone)]
pub struct PreloadCoordinator {
    shared: Arc<Shared>,
}

impl PreloadCoordinator {
    pub fn new(
        registry: NavRegistry,
        store: StoreProvider,
        router: Arc<dyn Router>,
        feedback: Arc<dyn FeedbackChannel>,
        config: PreloaderConfig,
    ) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                registry,
                store,
                router,
                feedback,
                config,
                slot: Mutex::new(None),
                open_sessions: Mutex::new(0),
                loading,
            }),
        }
    }

    pub fn registry(&self) -> &NavRegistry {
        &self.shared.registry
    }

    pub fn router(&self) -> &Arc<dyn Router> {
        &self.shared.router
    }

    pub fn config(&self) -> &PreloaderConfig {
        &self.shared.config
    }

    /// The page data store, failing fast if none has been provided
    pub fn store(&self) -> Result<&PageDataStore> {
        self.shared.store.get()
    }

    /// Start a navigation intent
    ///
    /// Everything up to and including spawning the preload happens before this
    /// returns, so the order of calls is the order of intents. Errors only for
    /// wiring defects (no store provided); preload failures and cancellations
    /// come back from [`Navigation::finish`] as outcomes.
    pub fn begin_navigation(&self, item: &NavigationItem, should_navigate: bool) -> Result<Navigation> {
        let path = item.path().to_string();

        if !item.needs_coordination() {
            self.cancel_active();
            if !should_navigate {
                return Ok(Navigation::done(
                    &self.shared,
                    item,
                    NavigationOutcome::Skipped { path },
                ));
            }
            info!("Navigating to {} (nothing to preload)", path);
            self.shared.router.navigate(&path);
            return Ok(Navigation::done(
                &self.shared,
                item,
                NavigationOutcome::Navigated { path },
            ));
        }

        let store = self.shared.store.get()?.clone();
        let mut slot = self.shared.lock_slot();

        if let Some(previous) = slot.take() {
            info!(
                "Cancelling preload of {} (task {}) in favour of {}",
                previous.path, previous.id, path
            );
            previous.handle.cancel();
        }

        let feedback_text = item.feedback();
        let session = match feedback_text {
            Some(text) => FeedbackSession::open(
                &self.shared,
                Some(&self.shared.config.start_message(Some(text))),
                text.description.as_deref(),
            ),
            None => FeedbackSession::open(&self.shared, None, None),
        };

        let task = match item.preload_operation() {
            None => CancelableTask::wrap(async { Ok(None) }),
            Some(operation) => match store.begin_load(&path) {
                LoadTicket::Lead(guard) => {
                    let operation = operation.clone();
                    let feedback = self.shared.feedback.clone();
                    let load_path = path.clone();
                    CancelableTask::wrap_with(move |signal| {
                        let ctx = PreloadContext::new(
                            load_path,
                            ProgressReporter::new(feedback, signal.clone()),
                            signal,
                        );
                        async move {
                            let result = operation.preload(ctx).await;
                            guard.finish(&result);
                            result.map(Some)
                        }
                    })
                }
                LoadTicket::Follow(waiter) => {
                    debug!("Preload for {} already in flight, waiting on it", path);
                    CancelableTask::wrap(async move { waiter.wait().await.map(Some) })
                }
            },
        };

        debug!("Coordinator - task {} now active for {}", task.id(), path);
        *slot = Some(ActiveTask {
            id: task.id(),
            path: path.clone(),
            handle: task.handle(),
        });
        drop(slot);

        Ok(Navigation {
            shared: self.shared.clone(),
            path,
            title: item.title().to_string(),
            feedback_text: feedback_text.cloned(),
            should_navigate,
            state: NavigationState::Pending { task, session },
        })
    }

    /// Start a navigation intent and wait for its outcome
    pub async fn preload_and_navigate(
        &self,
        item: &NavigationItem,
        should_navigate: bool,
    ) -> Result<NavigationOutcome> {
        Ok(self.begin_navigation(item, should_navigate)?.finish().await)
    }

    /// Navbar click: ignore the current page, otherwise preload and navigate
    pub async fn navigate_to(&self, path: &str) -> Result<NavigationOutcome> {
        if self.shared.router.current_path() == path {
            debug!("Already on {}, ignoring navigation", path);
            return Ok(NavigationOutcome::AlreadyThere {
                path: path.to_string(),
            });
        }

        let item = self
            .shared
            .registry
            .find(path)
            .cloned()
            .ok_or_else(|| PreloadError::UnknownRoute(path.to_string()))?;

        self.cancel_active();
        self.preload_and_navigate(&item, true).await
    }

    /// Cancel the active preload, if any. Returns whether one was canceled.
    pub fn cancel_active(&self) -> bool {
        let previous = self.shared.lock_slot().take();
        match previous {
            Some(active) => {
                info!("Cancelling active preload of {} (task {})", active.path, active.id);
                active.handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn active_task(&self) -> Option<ActiveTaskInfo> {
        self.shared.lock_slot().as_ref().map(|active| ActiveTaskInfo {
            id: active.id,
            path: active.path.clone(),
        })
    }

    /// True while any coordinated navigation is between start and end
    pub fn is_loading(&self) -> bool {
        *self.shared.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.shared.loading.subscribe()
    }
}
