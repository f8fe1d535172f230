use raffle_client::{Notification, Notifier};
use tracing::debug;

/// Prints notifications to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Loading(message) => println!("... {message}"),
            Notification::Dismiss => debug!("loading notification dismissed"),
            Notification::Success(message) => println!("\x1b[32m✔ {message}\x1b[0m"),
            Notification::Error(message) => eprintln!("\x1b[31m✘ {message}\x1b[0m"),
        }
    }
}
