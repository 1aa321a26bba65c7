//! Queue error types.

use dunning_core::{DunningError, NotificationStatus};
use thiserror::Error;

/// Error types for notification queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Notification not found in the store.
    #[error("notification not found: {notification_id}")]
    NotFound {
        /// The missing ID
        notification_id: String,
    },

    /// Notification with this ID already exists.
    #[error("notification already exists: {notification_id}")]
    Duplicate {
        /// The conflicting ID
        notification_id: String,
    },

    /// The requested status change is not part of the lifecycle.
    #[error("notification {notification_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The notification being changed
        notification_id: String,
        /// Current status
        from: NotificationStatus,
        /// Requested status
        to: NotificationStatus,
    },

    /// Input failed validation.
    #[error("invalid notification: {0}")]
    Invalid(String),
}

impl From<QueueError> for DunningError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Invalid(reason) => DunningError::Validation(reason),
            other => DunningError::Queue(other.to_string()),
        }
    }
}

/// Result type alias for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
