//! Notifications.
//!
//! Transient status messages raised while entering the raffle.

/// Shown once the entry transaction has been sent.
pub const AWAITING_CONFIRMATION_MESSAGE: &str = "Transaction sent. Waiting for confirmation...";

/// Shown once the entry transaction has been confirmed.
pub const ENTRY_SUCCESS_MESSAGE: &str = "Entered the raffle successfully!";

/// A status message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A long-running step has started.
    Loading(String),
    /// Any outstanding loading notification should be removed.
    Dismiss,
    /// The action succeeded.
    Success(String),
    /// The action failed.
    Error(String),
}

impl Notification {
    /// Returns whether this is an error notification.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }

    /// Returns whether this is a success notification.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success(_))
    }
}

/// Displays notifications to the user.
pub trait Notifier: Send + Sync + 'static {
    /// Show a notification.
    fn notify(&self, notification: Notification);

    /// Show a loading notification.
    fn loading(&self, message: &str) {
        self.notify(Notification::Loading(message.to_string()));
    }

    /// Remove any outstanding loading notification.
    fn dismiss(&self) {
        self.notify(Notification::Dismiss);
    }

    /// Show a success notification.
    fn success(&self, message: &str) {
        self.notify(Notification::Success(message.to_string()));
    }

    /// Show an error notification.
    fn error(&self, message: &str) {
        self.notify(Notification::Error(message.to_string()));
    }
}
