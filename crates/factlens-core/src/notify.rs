//! Transient notifications.
//!
//! The Analyze session reports backend failures through a [`Notifier`].
//! [`NotificationBroadcaster`] fans them out to every subscriber (the
//! WebSocket stream in the session server); the CLI prints them instead.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Something that can surface a transient message to the user.
pub trait Notifier: Send + Sync {
    /// Shows an error message.
    fn show_error(&self, message: &str);
}

/// A notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show_error(&self, _message: &str) {}
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Something failed.
    Error,
    /// Informational.
    Info,
}

/// A notification event.
///
/// Serialized as `{"event": "notification", "payload": {"level", "message"}}`
/// on the wire, or `{"event": "connected", "payload": {...}}` on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    /// Sent once when a client subscribes over WebSocket.
    Connected(ConnectedPayload),
    /// A toast to display.
    Notification(MessagePayload),
}

/// Payload for [`Notification::Connected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// Server version.
    pub version: String,
}

/// Payload for [`Notification::Notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Severity.
    pub level: Level,
    /// Text to display.
    pub message: String,
}

impl Notification {
    /// Creates a `Connected` event for this build.
    #[must_use]
    pub fn connected() -> Self {
        Self::Connected(ConnectedPayload {
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Creates an error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Notification(MessagePayload {
            level: Level::Error,
            message: message.into(),
        })
    }

    /// Creates an info toast.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::Notification(MessagePayload {
            level: Level::Info,
            message: message.into(),
        })
    }
}

/// Broadcasts notifications to all subscribers.
///
/// Notifications are not persisted; a subscriber only sees what is sent
/// after it subscribes.
#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBroadcaster {
    /// Creates a broadcaster with the given per-subscriber buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Sends a notification, returning how many subscribers received it.
    pub fn send(&self, notification: Notification) -> usize {
        // Err only means nobody is listening.
        self.sender.send(notification).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Notifier for NotificationBroadcaster {
    fn show_error(&self, message: &str) {
        let delivered = self.send(Notification::error(message));
        tracing::debug!(delivered, "Error notification broadcast");
    }
}
