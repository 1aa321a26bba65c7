//! Send orchestration: render, dispatch, record the outcome.

use crate::{
    dispatcher::{DeliveryOutcome, Dispatcher},
    error::{DeliveryError, Result},
    message::OutboundMessage,
};
use dunning_core::{Channel, NotificationId, NotificationStatus, Timestamp};
use dunning_queue::{resolve_channel, Notification, NotificationStore, QueueError};
use dunning_templates::TemplateStore;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Sends queued notifications through a [`Dispatcher`].
///
/// At most one send per notification ID runs at a time; a second request
/// for the same ID fails fast with [`DeliveryError::InFlight`].
#[derive(Clone)]
pub struct Outbox {
    notifications: NotificationStore,
    templates: TemplateStore,
    dispatcher: Arc<dyn Dispatcher>,
    in_flight: Arc<Mutex<HashSet<NotificationId>>>,
}

/// Releases an in-flight reservation when dropped.
struct InFlightGuard {
    id: NotificationId,
    in_flight: Arc<Mutex<HashSet<NotificationId>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.id);
        }
    }
}

impl Outbox {
    /// Create an outbox over the session's stores.
    pub fn new(
        notifications: NotificationStore,
        templates: TemplateStore,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            notifications,
            templates,
            dispatcher,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a send for `id` is currently running.
    #[must_use]
    pub fn is_in_flight(&self, id: &NotificationId) -> bool {
        self.in_flight
            .lock()
            .expect("acquire in-flight lock")
            .contains(id)
    }

    /// Build the message `notification` would be sent as.
    ///
    /// Returns `None` when the referenced template no longer exists.
    #[must_use]
    pub fn prepare(&self, notification: &Notification) -> Option<OutboundMessage> {
        let channel = resolve_channel(notification, &self.templates);
        let rendered = notification.render(&self.templates)?;

        Some(OutboundMessage {
            notification_id: notification.id.clone(),
            channel,
            to: notification.recipient.clone(),
            subject: if channel == Channel::Email {
                rendered.subject
            } else {
                None
            },
            body: rendered.body,
        })
    }

    /// Send one notification now and record the result.
    ///
    /// Returns the notification as stored afterwards: `Sent` with `sent_at`
    /// stamped, or `Failed` if the backend rejected it, could not be reached,
    /// or the template is gone and there is nothing to send.
    ///
    /// # Errors
    /// Returns error if the notification is unknown, already sent or failed,
    /// or a send for it is already running.
    pub async fn send_now(&self, id: &NotificationId) -> Result<Notification> {
        let _guard = self.reserve(id)?;

        let notification = self
            .notifications
            .get(id)
            .ok_or_else(|| QueueError::NotFound {
                notification_id: id.to_string(),
            })?;
        if !notification.status.can_transition_to(NotificationStatus::Sent) {
            return Err(QueueError::InvalidTransition {
                notification_id: id.to_string(),
                from: notification.status,
                to: NotificationStatus::Sent,
            }
            .into());
        }

        let Some(message) = self.prepare(&notification) else {
            warn!(
                notification_id = %id,
                template_id = %notification.template_id,
                "template missing, not dispatching"
            );
            return Ok(self.notifications.mark_failed(id)?);
        };
        info!(notification_id = %id, channel = %message.channel, "sending notification");

        let outcome = match message.channel {
            Channel::Email => self.dispatcher.send_email(&message).await,
            Channel::Sms => self.dispatcher.send_sms(&message).await,
        };

        let updated = match outcome {
            Ok(DeliveryOutcome::Delivered) => {
                info!(notification_id = %id, "{} sent successfully", message.channel.display_name());
                self.notifications.mark_sent(id, Timestamp::now())?
            }
            Ok(DeliveryOutcome::Rejected(reason)) => {
                warn!(notification_id = %id, %reason, "backend rejected notification");
                self.notifications.mark_failed(id)?
            }
            Err(e) => {
                warn!(notification_id = %id, error = %e, "failed to send notification");
                self.notifications.mark_failed(id)?
            }
        };
        Ok(updated)
    }

    /// Send several notifications concurrently.
    ///
    /// Results are returned in the order of `ids`.
    pub async fn send_all(&self, ids: &[NotificationId]) -> Vec<Result<Notification>> {
        join_all(ids.iter().map(|id| self.send_now(id))).await
    }

    fn reserve(&self, id: &NotificationId) -> Result<InFlightGuard> {
        let mut set = self.in_flight.lock().expect("acquire in-flight lock");
        if !set.insert(id.clone()) {
            return Err(DeliveryError::InFlight {
                notification_id: id.to_string(),
            });
        }
        Ok(InFlightGuard {
            id: id.clone(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}
