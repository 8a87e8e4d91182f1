//! Spinner shown on stdout while a page preloads

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);
const NO_PROGRESS: u32 = u32::MAX;

/// Animated progress indicator
///
/// Starts when created and stops when dropped. Must be created inside a
/// tokio runtime.
pub struct Spinner {
    progress: Arc<AtomicU32>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        let progress = Arc::new(AtomicU32::new(NO_PROGRESS));
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = tokio::spawn(Self::run_spinner(message, progress.clone(), stop_rx));

        Self {
            progress,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Show a percentage next to the message
    pub fn set_progress(&self, fraction: f32) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        self.progress.store(percent, Ordering::Relaxed);
    }

    pub fn stop(mut self) {
        self.stop_internal();
    }

    fn stop_internal(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            // Can't await in Drop
            handle.abort();
        }

        Self::clear_line();
    }

    async fn run_spinner(message: String, progress: Arc<AtomicU32>, mut stop_rx: oneshot::Receiver<()>) {
        let mut frame = 0;
        let mut stdout = io::stdout();

        loop {
            let spinner_char = SPINNER_CHARS[frame % SPINNER_CHARS.len()];
            match progress.load(Ordering::Relaxed) {
                NO_PROGRESS => print!("\r\x1b[K{} {}", spinner_char, message),
                percent => print!("\r\x1b[K{} {} {:>3}%", spinner_char, message, percent),
            }
            let _ = stdout.flush();

            frame += 1;

            tokio::select! {
                _ = tokio::time::sleep(SPINNER_INTERVAL) => {},
                _ = &mut stop_rx => break,
            }
        }

        Self::clear_line();
    }

    fn clear_line() {
        print!("\r\x1b[K");
        let _ = io::stdout().flush();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop_internal();
    }
}
