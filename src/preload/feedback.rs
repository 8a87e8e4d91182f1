use log::{error, info};
use std::sync::Arc;

use super::cancelable::CancelSignal;

/// Loading feedback consumer (progress bar, toast, spinner...)
///
/// The coordinator pairs every `start` with exactly one `end`, whatever the
/// outcome of the load. `report_error` is only called for real failures,
/// never for a canceled load.
///
/// `start` runs while the coordinator holds its active-slot lock, so an
/// implementation must not call back into the coordinator from it
/// (`cancel_active`, `active_task`, `begin_navigation`...): that deadlocks.
/// The other methods run with no coordinator lock held.
pub trait FeedbackChannel: Send + Sync {
    /// Loading indicator on. Message and description are present when the
    /// navigation item carries feedback text.
    fn start(&self, message: Option<&str>, description: Option<&str>);

    /// Progress of the current load, between 0.0 and 1.0
    fn update(&self, _fraction: f32) {}

    fn end(&self);

    fn report_error(&self, message: &str);

    fn report_success(&self, _message: &str) {}
}

/// Feedback channel that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackChannel for LogFeedback {
    fn start(&self, message: Option<&str>, description: Option<&str>) {
        match (message, description) {
            (Some(message), Some(description)) => info!("⏳ {} ({})", message, description),
            (Some(message), None) => info!("⏳ {}", message),
            _ => info!("⏳ Loading"),
        }
    }

    fn update(&self, fraction: f32) {
        info!("   progress {:.0}%", fraction * 100.0);
    }

    fn end(&self) {
        info!("⏹ Loading finished");
    }

    fn report_error(&self, message: &str) {
        error!("❌ {}", message);
    }

    fn report_success(&self, message: &str) {
        info!("✓ {}", message);
    }
}

/// Progress handle given to a preload operation
///
/// Updates stop reaching the feedback channel once the owning task is
/// canceled, so a stale load cannot move the indicator of the current one.
#[derive(Clone)]
pub struct ProgressReporter {
    feedback: Arc<dyn FeedbackChannel>,
    signal: CancelSignal,
}

impl ProgressReporter {
    pub fn new(feedback: Arc<dyn FeedbackChannel>, signal: CancelSignal) -> Self {
        Self { feedback, signal }
    }

    pub fn set(&self, fraction: f32) {
        if self.signal.is_canceled() {
            return;
        }
        self.feedback.update(fraction.clamp(0.0, 1.0));
    }
}
