use colored::*;
use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::spinner::Spinner;
use crate::preload::FeedbackChannel;

#[derive(Default)]
struct State {
    spinner: Option<Spinner>,
    depth: usize,
}

/// Feedback channel drawing a spinner and colored toasts on the terminal
///
/// Nested starts share one spinner; it disappears when the last one ends.
#[derive(Default)]
pub struct TerminalFeedback {
    state: Mutex<State>,
}

impl TerminalFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedbackChannel for TerminalFeedback {
    fn start(&self, message: Option<&str>, description: Option<&str>) {
        let mut state = self.lock();
        state.depth += 1;

        let label = match (message, description) {
            (Some(message), Some(description)) => format!("{} {}", message, description.dimmed()),
            (Some(message), None) => message.to_string(),
            _ => "Loading".to_string(),
        };
        // Replacing the spinner drops the previous one, which clears its line
        state.spinner = Some(Spinner::start(label));
        debug!("TerminalFeedback - start (depth {})", state.depth);
    }

    fn update(&self, fraction: f32) {
        if let Some(spinner) = &self.lock().spinner {
            spinner.set_progress(fraction);
        }
    }

    fn end(&self) {
        let mut state = self.lock();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.spinner = None;
        }
        debug!("TerminalFeedback - end (depth {})", state.depth);
    }

    fn report_error(&self, message: &str) {
        println!("\r\x1b[K{} {}", "❌".red(), message.bright_red());
    }

    fn report_success(&self, message: &str) {
        println!("\r\x1b[K{} {}", "✓".bright_green().bold(), message.green());
    }
}
