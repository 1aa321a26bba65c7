//! Backend seam for sending email and SMS.

use crate::{
    error::{DeliveryError, Result},
    message::{body_hash, OutboundMessage},
};
use async_trait::async_trait;
use dunning_core::DeliveryConfig;
use std::time::Duration;
use tracing::info;

/// What the backend reported for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The backend accepted the message
    Delivered,
    /// The backend refused the message
    Rejected(String),
}

impl DeliveryOutcome {
    /// Whether the message was accepted.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// An email/SMS backend.
///
/// `Err` means the backend could not be asked at all; a refusal is an
/// `Ok(DeliveryOutcome::Rejected)`. Callers treat both as a failed send.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Send an email message.
    async fn send_email(&self, message: &OutboundMessage) -> Result<DeliveryOutcome>;

    /// Send an SMS message.
    async fn send_sms(&self, message: &OutboundMessage) -> Result<DeliveryOutcome>;
}

/// Stand-in backend: waits, then reports a fixed outcome.
#[derive(Debug, Clone)]
pub struct SimulatedDispatcher {
    delay: Duration,
    fail: bool,
}

impl SimulatedDispatcher {
    /// Create a dispatcher that always succeeds after `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    /// Create a dispatcher that always rejects after `delay`.
    #[must_use]
    pub fn failing(delay: Duration) -> Self {
        Self { delay, fail: true }
    }

    /// Create a dispatcher from the delivery section of the app config.
    #[must_use]
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.simulated_delay_ms),
            fail: config.simulate_failure,
        }
    }

    async fn simulate(&self, message: &OutboundMessage) -> Result<DeliveryOutcome> {
        info!(
            notification_id = %message.notification_id,
            channel = %message.channel,
            body_sha256 = %body_hash(&message.body),
            "simulating send"
        );
        if message.to.trim().is_empty() {
            return Err(DeliveryError::Dispatch("empty recipient".to_string()));
        }

        tokio::time::sleep(self.delay).await;

        if self.fail {
            Ok(DeliveryOutcome::Rejected(
                "simulated backend rejection".to_string(),
            ))
        } else {
            Ok(DeliveryOutcome::Delivered)
        }
    }
}

impl Default for SimulatedDispatcher {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

#[async_trait]
impl Dispatcher for SimulatedDispatcher {
    async fn send_email(&self, message: &OutboundMessage) -> Result<DeliveryOutcome> {
        self.simulate(message).await
    }

    async fn send_sms(&self, message: &OutboundMessage) -> Result<DeliveryOutcome> {
        self.simulate(message).await
    }
}
