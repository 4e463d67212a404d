//! Callbacks into the host application.
//!
//! The façades never draw anything themselves. Confirmation prompts,
//! user-facing notices and permission requests go through these traits, which
//! the host implements on top of its UI toolkit.

use async_trait::async_trait;
use derive_more::{Display, Error};

/// A two-choice prompt: cancel, or perform a (usually destructive) action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    /// Label of the confirming choice.
    pub confirm_label: String,
    /// Whether the confirming choice destroys data.
    pub destructive: bool,
}

impl Confirmation {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "OK".to_string(),
            destructive: false,
        }
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// Prompts and notices shown by the host.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Show `prompt` and wait for the reader's choice; `true` means confirmed.
    async fn confirm(&self, prompt: Confirmation) -> bool;

    /// Show a notice the reader only has to acknowledge.
    async fn alert(&self, title: &str, message: &str);
}

/// Outcome of a notification permission request.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    #[display("granted")]
    Granted,
    #[display("denied")]
    Denied,
    #[display("undetermined")]
    Undetermined,
}

/// The host could not complete a permission request.
#[derive(Debug, Display, Error)]
#[display("permission request failed: {reason}")]
pub struct PermissionError {
    #[error(not(source))]
    pub reason: String,
}

/// Access to the platform's notification permission.
#[async_trait]
pub trait NotificationPermissions: Send + Sync {
    async fn request(&self) -> Result<PermissionStatus, PermissionError>;
}
