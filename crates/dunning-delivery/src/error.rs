//! Delivery error types.

use dunning_core::DunningError;
use dunning_queue::QueueError;
use thiserror::Error;

/// Error types for delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A send for this notification is already running.
    #[error("a send is already in flight for notification {notification_id}")]
    InFlight {
        /// The notification being sent
        notification_id: String,
    },

    /// The notification cannot be sent in its current state.
    #[error("notification queue error: {0}")]
    Queue(#[from] QueueError),

    /// The backend could not be reached or rejected the request.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl From<DeliveryError> for DunningError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Queue(queue) => queue.into(),
            other => DunningError::Delivery(other.to_string()),
        }
    }
}

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;
