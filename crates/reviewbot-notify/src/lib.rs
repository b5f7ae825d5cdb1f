//! Notification layer: deliver a text message to one configured chat.

mod telegram;

pub use telegram::{DEFAULT_API_URL, TelegramNotifier};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("message delivery failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("chat API rejected the message ({status}): {description}")]
    Api { status: u16, description: String },
}

/// Sends text to a fixed destination.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
