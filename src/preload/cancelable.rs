//! Cancelable wrapper around a single asynchronous operation
//!
//! Cancellation is observational, not preemptive. The wrapped operation is
//! spawned onto the tokio runtime and always runs to completion: an asset
//! fetch that was already started keeps going after `cancel()`. What changes
//! is the outcome seen by whoever settles the task, which becomes
//! [`Settled::Canceled`] no matter how the operation eventually ends. Callers
//! use that to suppress the consequences of a stale load (commit + navigate).
//!
//! Operations that want to stop early can observe the [`CancelSignal`] handed
//! to them by [`CancelableTask::wrap_with`]; doing so is optional.

use log::debug;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const PENDING: u8 = 0;
const SETTLED: u8 = 1;
const CANCELED: u8 = 2;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a cancelable task, unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a task is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Operation still running and nobody canceled it
    Pending,

    /// Operation finished before any cancellation; its outcome is kept
    Settled,

    /// `cancel()` came before the operation finished
    Canceled,
}

/// Outcome of settling a cancelable task
#[derive(Debug)]
pub enum Settled<T> {
    Ok(T),
    Canceled,
    Failed(anyhow::Error),
}

impl<T> Settled<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Settled::Ok(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Settled::Canceled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Settled::Failed(_))
    }
}

struct TaskState {
    status: AtomicU8,
    token: CancellationToken,
}

impl TaskState {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(PENDING),
            token: CancellationToken::new(),
        }
    }

    /// Pending -> Canceled. Returns false if already settled or canceled.
    fn cancel(&self) -> bool {
        let won = self
            .status
            .compare_exchange(PENDING, CANCELED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.token.cancel();
        }
        won
    }

    /// Pending -> Settled. Returns false if a cancel got there first.
    fn settle(&self) -> bool {
        self.status
            .compare_exchange(PENDING, SETTLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn status(&self) -> TaskStatus {
        match self.status.load(Ordering::Acquire) {
            PENDING => TaskStatus::Pending,
            SETTLED => TaskStatus::Settled,
            _ => TaskStatus::Canceled,
        }
    }
}

/// Cloneable handle used to cancel a task from elsewhere (e.g. the active slot)
#[derive(Clone)]
pub struct CancelHandle {
    id: TaskId,
    state: Arc<TaskState>,
}

impl CancelHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Mark the task canceled. Idempotent; a no-op once the task has settled.
    pub fn cancel(&self) {
        if self.state.cancel() {
            debug!("Task {} canceled", self.id);
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.state.status() == TaskStatus::Canceled
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    /// Signal an operation can watch to notice it has been canceled
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            token: self.state.token.clone(),
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

/// Read-only view of a task's cancellation, given to the wrapped operation
#[derive(Clone, Debug)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    /// A signal that never fires, for operations run outside any task
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the owning task is canceled
    pub async fn canceled(&self) {
        self.token.cancelled().await
    }
}

/// One asynchronous operation whose outcome can be disregarded
///
/// The operation starts running as soon as the task is created. Dropping the
/// task without settling it leaves the operation running detached.
#[must_use = "the outcome of a cancelable task is only observed through settle()"]
pub struct CancelableTask<T> {
    id: TaskId,
    state: Arc<TaskState>,
    // None when the operation finished after a cancel
    join: JoinHandle<Option<anyhow::Result<T>>>,
}

impl<T: Send + 'static> CancelableTask<T> {
    /// Wrap an operation that does not care about cancellation
    pub fn wrap<F>(operation: F) -> Self
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::wrap_with(|_| operation)
    }

    /// Wrap an operation built from the task's own cancel signal
    ///
    /// Must be called from within a tokio runtime.
    pub fn wrap_with<M, F>(make: M) -> Self
    where
        M: FnOnce(CancelSignal) -> F,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let id = TaskId::next();
        let state = Arc::new(TaskState::new());
        let operation = make(CancelSignal {
            token: state.token.clone(),
        });
        let task_state = state.clone();
        let join = tokio::spawn(async move {
            let result = operation.await;
            // The outcome is fixed here; a later cancel() is a no-op
            task_state.settle().then_some(result)
        });
        debug!("Task {} spawned", id);

        Self { id, state, join }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            id: self.id,
            state: self.state.clone(),
        }
    }

    pub fn cancel(&self) {
        self.handle().cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.state.status() == TaskStatus::Canceled
    }

    /// Wait for the outcome
    ///
    /// Returns `Canceled` as soon as the task is canceled, without waiting for
    /// the underlying operation, which carries on in the background. An
    /// operation that already finished keeps its outcome whatever happens
    /// between then and this call.
    pub async fn settle(self) -> Settled<T> {
        let CancelableTask { id, state, mut join } = self;

        tokio::select! {
            biased;
            _ = state.token.cancelled() => Settled::Canceled,
            joined = &mut join => match joined {
                Ok(Some(Ok(value))) => Settled::Ok(value),
                Ok(Some(Err(err))) => Settled::Failed(err),
                Ok(None) => Settled::Canceled,
                // A panicking operation never reached its own settle point
                Err(join_err) if state.settle() => {
                    Settled::Failed(anyhow::anyhow!("task {} did not complete: {}", id, join_err))
                }
                Err(_) => Settled::Canceled,
            },
        }
    }
}
