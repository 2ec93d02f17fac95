use std::future::Future;

use uuid::Uuid;

use crate::models::Notification;

/// Failures reported by a notification store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Transport failure: unreachable server, timeout, connection reset.
    #[error("Network failure: {0}")]
    Network(String),
    /// Stale identifier (e.g. a double delete).
    #[error("Notification not found")]
    NotFound { message: Option<String> },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Server returned {status}")]
    Server { status: u16, message: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Local client setup failed before any request was sent.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl StoreError {
    /// Human-readable message provided by the server, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::NotFound { message } | StoreError::Server { message, .. } => {
                message.as_deref()
            }
            StoreError::Validation(message) => Some(message),
            StoreError::Network(_) | StoreError::Decode(_) | StoreError::Client(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Server-side notification store as seen by the client.
///
/// A store handle is bound to one authenticated recipient; every call
/// acts on that recipient's notifications.
pub trait NotificationStore: Send + Sync + 'static {
    /// All notifications for the recipient, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Notification>, StoreError>> + Send;

    /// Idempotent: marking an already-read notification succeeds.
    fn mark_read(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Permanent removal.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;
}
