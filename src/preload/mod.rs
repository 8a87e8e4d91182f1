//! Page preload coordination
//!
//! Navigation intents go through a [`PreloadCoordinator`], which runs the
//! target page's preload inside a [`CancelableTask`], commits the result to
//! the [`PageDataStore`] and only then asks the [`Router`] to navigate.
//! Pages reached directly use [`PageMount`] to load themselves.

pub mod cancelable;
pub mod coordinator;
pub mod error;
pub mod feedback;
pub mod mount;
pub mod registry;
pub mod resource;
pub mod router;
pub mod store;

pub use cancelable::{CancelHandle, CancelSignal, CancelableTask, Settled, TaskId, TaskStatus};
pub use coordinator::{ActiveTaskInfo, Navigation, NavigationOutcome, PreloadCoordinator};
pub use error::{PreloadError, Result};
pub use feedback::{FeedbackChannel, LogFeedback, ProgressReporter};
pub use mount::{MountOutcome, PageMount};
pub use registry::{
    FeedbackText, NavRegistry, NavigationItem, PreloadContext, PreloadFn, PreloadOperation,
};
pub use resource::Resource;
pub use router::{MemoryRouter, Router};
pub use store::{
    InFlightGuard, LoadTicket, LoadWaiter, PageData, PageDataStore, PageEntry, StoreProvider,
};
