//! In-memory notification store owned by the application session.

use crate::{
    error::{QueueError, Result},
    filter::{filter, ChannelFilter, StatusFilter},
    model::Notification,
};
use dunning_core::{NotificationId, NotificationStatus, Priority, TemplateId, Timestamp, TriggerType};
use dunning_templates::TemplateLookup;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Ordered collection of notifications.
///
/// Cloning the store shares the underlying collection. Every mutation keeps
/// `sent_at` present exactly when the status is `Sent`.
#[derive(Clone, Default)]
pub struct NotificationStore {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one sent email and one scheduled SMS.
    #[must_use]
    pub fn with_defaults() -> Self {
        let store = Self::new();
        {
            let mut cache = store
                .notifications
                .write()
                .expect("acquire write lock on notifications");
            cache.extend(default_notifications());
        }
        store
    }

    /// Snapshot of every notification, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.notifications
            .read()
            .expect("acquire read lock on notifications")
            .clone()
    }

    /// Get a notification by ID.
    #[must_use]
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        let cache = self
            .notifications
            .read()
            .expect("acquire read lock on notifications");

        cache.iter().find(|n| &n.id == id).cloned()
    }

    /// Number of notifications in the store.
    #[must_use]
    pub fn count(&self) -> usize {
        self.notifications
            .read()
            .expect("acquire read lock on notifications")
            .len()
    }

    /// Notifications matching `status` and `channel`, in insertion order.
    #[must_use]
    pub fn filtered<L: TemplateLookup + ?Sized>(
        &self,
        status: StatusFilter,
        channel: ChannelFilter,
        lookup: &L,
    ) -> Vec<Notification> {
        let cache = self
            .notifications
            .read()
            .expect("acquire read lock on notifications");

        filter(&cache, status, channel, lookup)
    }

    /// Add a notification.
    ///
    /// # Errors
    /// Returns error if the ID is taken or `sent_at` disagrees with the status.
    pub fn insert(&self, notification: Notification) -> Result<()> {
        check_consistent(&notification)?;
        check_recipient(&notification)?;

        let mut cache = self
            .notifications
            .write()
            .expect("acquire write lock on notifications");

        if cache.iter().any(|n| n.id == notification.id) {
            return Err(QueueError::Duplicate {
                notification_id: notification.id.to_string(),
            });
        }

        info!(
            notification_id = %notification.id,
            status = %notification.status,
            "queued notification"
        );
        cache.push(notification);
        Ok(())
    }

    /// Add a batch of notifications, all or none.
    ///
    /// Every notification is checked (including against the others in the
    /// batch) before any is stored.
    ///
    /// # Errors
    /// Returns the first validation or duplicate-ID error; the store is left
    /// unchanged.
    pub fn insert_all(&self, notifications: Vec<Notification>) -> Result<()> {
        for notification in &notifications {
            check_consistent(notification)?;
            check_recipient(notification)?;
        }

        let mut cache = self
            .notifications
            .write()
            .expect("acquire write lock on notifications");

        for (i, notification) in notifications.iter().enumerate() {
            let taken = cache.iter().any(|n| n.id == notification.id)
                || notifications[..i].iter().any(|n| n.id == notification.id);
            if taken {
                return Err(QueueError::Duplicate {
                    notification_id: notification.id.to_string(),
                });
            }
        }

        info!(count = notifications.len(), "queued notification batch");
        cache.extend(notifications);
        Ok(())
    }

    /// Save an edited notification in place.
    ///
    /// The status may stay the same or take one legal lifecycle step.
    ///
    /// # Errors
    /// Returns error if the notification is unknown, the status change is
    /// illegal, or `sent_at` disagrees with the status.
    pub fn update(&self, mut edited: Notification) -> Result<()> {
        check_consistent(&edited)?;
        check_recipient(&edited)?;

        let mut cache = self
            .notifications
            .write()
            .expect("acquire write lock on notifications");

        let slot = find_mut(&mut cache, &edited.id)?;
        if slot.status != edited.status && !slot.status.can_transition_to(edited.status) {
            return Err(QueueError::InvalidTransition {
                notification_id: edited.id.to_string(),
                from: slot.status,
                to: edited.status,
            });
        }

        edited.created_at = slot.created_at;
        edited.updated_at = Timestamp::now();
        info!(notification_id = %edited.id, "updated notification");
        *slot = edited;
        Ok(())
    }

    /// Remove a notification, whatever its status.
    ///
    /// Returns the removed notification, if it existed.
    pub fn remove(&self, id: &NotificationId) -> Option<Notification> {
        let mut cache = self
            .notifications
            .write()
            .expect("acquire write lock on notifications");

        let index = cache.iter().position(|n| &n.id == id)?;
        info!(notification_id = %id, "removed notification from queue");
        Some(cache.remove(index))
    }

    /// Record a successful send at `at`.
    ///
    /// # Errors
    /// Returns error if the notification is unknown or already terminal.
    pub fn mark_sent(&self, id: &NotificationId, at: Timestamp) -> Result<Notification> {
        self.transition(id, NotificationStatus::Sent, |n| {
            n.sent_at = Some(at);
        })
    }

    /// Record a failed send.
    ///
    /// # Errors
    /// Returns error if the notification is unknown or already terminal.
    pub fn mark_failed(&self, id: &NotificationId) -> Result<Notification> {
        self.transition(id, NotificationStatus::Failed, |n| {
            n.sent_at = None;
        })
    }

    /// Move a draft to `Scheduled` for `at`.
    ///
    /// # Errors
    /// Returns error if the notification is unknown or not a draft.
    pub fn schedule(&self, id: &NotificationId, at: Timestamp) -> Result<Notification> {
        self.transition(id, NotificationStatus::Scheduled, |n| {
            n.scheduled_at = Some(at);
        })
    }

    fn transition<F>(&self, id: &NotificationId, to: NotificationStatus, apply: F) -> Result<Notification>
    where
        F: FnOnce(&mut Notification),
    {
        let mut cache = self
            .notifications
            .write()
            .expect("acquire write lock on notifications");

        let slot = find_mut(&mut cache, id)?;
        if !slot.status.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                notification_id: id.to_string(),
                from: slot.status,
                to,
            });
        }

        info!(notification_id = %id, from = %slot.status, %to, "status change");
        slot.status = to;
        apply(slot);
        slot.updated_at = Timestamp::now();
        Ok(slot.clone())
    }
}

fn find_mut<'a>(cache: &'a mut [Notification], id: &NotificationId) -> Result<&'a mut Notification> {
    cache
        .iter_mut()
        .find(|n| &n.id == id)
        .ok_or_else(|| QueueError::NotFound {
            notification_id: id.to_string(),
        })
}

fn check_consistent(notification: &Notification) -> Result<()> {
    if notification.is_consistent() {
        Ok(())
    } else {
        Err(QueueError::Invalid(format!(
            "notification {} has status {} but sent_at is {}",
            notification.id,
            notification.status,
            if notification.sent_at.is_some() { "set" } else { "unset" }
        )))
    }
}

fn check_recipient(notification: &Notification) -> Result<()> {
    if notification.recipient.trim().is_empty() {
        Err(QueueError::Invalid(format!(
            "notification {} has no recipient",
            notification.id
        )))
    } else {
        Ok(())
    }
}

fn ts(s: &str) -> Timestamp {
    Timestamp::from_rfc3339(s).unwrap_or_default()
}

fn default_notifications() -> Vec<Notification> {
    vec![
        Notification::new(
            TemplateId::new("1").expect("valid built-in template ID"),
            "user@example.com",
        )
        .with_id(NotificationId::new("1").expect("valid built-in notification ID"))
        .with_variable("name", "John Doe")
        .with_variable("amount", "$100")
        .with_variable("dueDate", "2023-02-01")
        .with_priority(Priority::Medium)
        .with_trigger(TriggerType::Automatic)
        .with_timestamp(ts("2023-01-20T00:00:00Z"))
        .scheduled_for(ts("2023-01-25T00:00:00Z"))
        .delivered_at(ts("2023-01-25T00:00:00Z")),
        Notification::new(
            TemplateId::new("4").expect("valid built-in template ID"),
            "+1234567890",
        )
        .with_id(NotificationId::new("2").expect("valid built-in notification ID"))
        .with_variable("name", "Jane Smith")
        .with_variable("amount", "$200")
        .with_variable("dueDate", "2023-02-15")
        .with_priority(Priority::High)
        .with_trigger(TriggerType::Automatic)
        .with_timestamp(ts("2023-02-01T00:00:00Z"))
        .scheduled_for(ts("2023-02-10T00:00:00Z")),
    ]
}
