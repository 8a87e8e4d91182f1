//! Terminal rendering of loading feedback

pub mod spinner;
pub mod terminal_feedback;

pub use spinner::Spinner;
pub use terminal_feedback::TerminalFeedback;
