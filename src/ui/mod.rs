//! @acp:module "Interaction"
//! @acp:summary "User interaction seam for flows"
//! @acp:domain cli
//! @acp:layer feature
//!
//! User interaction
//!
//! Flows talk to the user only through [`Interaction`]: blocking notices,
//! yes/no confirmations, free-text prompts and the busy overlay.

pub mod state;
pub mod terminal;

pub use state::{positive_number, Field, FormInputs, UiState, ALL};
pub use terminal::TerminalInteraction;

/// Severity of a blocking notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
}

pub trait Interaction {
    /// Show a message the user has to see before the flow moves on
    fn notify(&mut self, notice: Notice, message: &str);

    /// Yes/no question
    fn confirm(&mut self, message: &str) -> crate::Result<bool>;

    /// Free-text question; `None` when the user leaves it blank
    fn prompt(&mut self, message: &str, default: Option<&str>) -> crate::Result<Option<String>>;

    /// Show the busy overlay. Calling it while shown only updates the message.
    fn show_overlay(&mut self, message: &str);

    /// Remove the busy overlay if it is shown
    fn hide_overlay(&mut self);
}
