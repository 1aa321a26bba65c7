//! Notification data model.

use dunning_core::{NotificationId, NotificationStatus, Priority, TemplateId, Timestamp, TriggerType};
use dunning_templates::{render_message, RenderedMessage, TemplateLookup};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label shown in place of a template name when the reference is stale.
pub const UNKNOWN_TEMPLATE_LABEL: &str = "Custom Message";

/// One addressed instance of a template with bound variable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: NotificationId,
    /// Template this notification was built from (may no longer exist)
    pub template_id: TemplateId,
    /// Email address or phone number, depending on the template's channel
    pub recipient: String,
    /// Values bound to template placeholders
    pub variables: HashMap<String, String>,
    /// Priority
    pub priority: Priority,
    /// Lifecycle status
    pub status: NotificationStatus,
    /// Manual or automatic origin
    pub trigger_type: TriggerType,
    /// When the notification is due to go out
    pub scheduled_at: Option<Timestamp>,
    /// When it was delivered; set iff `status` is `Sent`
    pub sent_at: Option<Timestamp>,
    /// When the notification was created
    pub created_at: Timestamp,
    /// When it was last modified
    pub updated_at: Timestamp,
}

impl Notification {
    /// Create a draft notification with a fresh ID.
    #[must_use]
    pub fn new(template_id: TemplateId, recipient: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: NotificationId::generate(),
            template_id,
            recipient: recipient.into(),
            variables: HashMap::new(),
            priority: Priority::default(),
            status: NotificationStatus::Draft,
            trigger_type: TriggerType::default(),
            scheduled_at: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Use a specific ID.
    #[must_use]
    pub fn with_id(mut self, id: NotificationId) -> Self {
        self.id = id;
        self
    }

    /// Bind a placeholder value.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the trigger origin.
    #[must_use]
    pub fn with_trigger(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = trigger_type;
        self
    }

    /// Schedule for `at`, moving the notification to `Scheduled`.
    #[must_use]
    pub fn scheduled_for(mut self, at: Timestamp) -> Self {
        self.status = NotificationStatus::Scheduled;
        self.scheduled_at = Some(at);
        self
    }

    /// Mark as already sent at `at`.
    #[must_use]
    pub fn delivered_at(mut self, at: Timestamp) -> Self {
        self.status = NotificationStatus::Sent;
        self.sent_at = Some(at);
        self
    }

    /// Set both creation and update timestamps.
    #[must_use]
    pub fn with_timestamp(mut self, at: Timestamp) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Whether `sent_at` is present exactly when the status is `Sent`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.status == NotificationStatus::Sent) == self.sent_at.is_some()
    }

    /// Name of the referenced template, or [`UNKNOWN_TEMPLATE_LABEL`].
    #[must_use]
    pub fn template_label<L: TemplateLookup + ?Sized>(&self, lookup: &L) -> String {
        lookup
            .lookup(&self.template_id)
            .map_or_else(|| UNKNOWN_TEMPLATE_LABEL.to_string(), |t| t.name)
    }

    /// Render the referenced template with this notification's variables.
    ///
    /// `None` when the template no longer exists.
    #[must_use]
    pub fn render<L: TemplateLookup + ?Sized>(&self, lookup: &L) -> Option<RenderedMessage> {
        lookup
            .lookup(&self.template_id)
            .map(|template| render_message(&template, &self.variables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dunning_templates::TemplateStore;

    fn tid(s: &str) -> TemplateId {
        TemplateId::new(s).expect("valid test template ID")
    }

    #[test]
    fn test_new_is_consistent_draft() {
        let n = Notification::new(tid("1"), "user@example.com");
        assert_eq!(n.status, NotificationStatus::Draft);
        assert!(n.is_consistent());
    }

    #[test]
    fn test_builders() {
        let at = Timestamp::from_rfc3339("2023-02-10T00:00:00Z").unwrap();
        let n = Notification::new(tid("4"), "+1234567890")
            .with_priority(Priority::High)
            .with_trigger(TriggerType::Automatic)
            .scheduled_for(at);
        assert_eq!(n.status, NotificationStatus::Scheduled);
        assert_eq!(n.scheduled_at, Some(at));
        assert!(n.is_consistent());

        let sent = n.clone().delivered_at(at);
        assert!(sent.is_consistent());

        let mut broken = sent;
        broken.status = NotificationStatus::Failed;
        assert!(!broken.is_consistent());
    }

    #[test]
    fn test_template_label_and_render() {
        let store = TemplateStore::with_defaults();
        let n = Notification::new(tid("3"), "user@example.com")
            .with_variable("name", "John Doe")
            .with_variable("amount", "$100");

        assert_eq!(n.template_label(&store), "Payment Confirmation");
        let rendered = n.render(&store).expect("template 3 exists");
        assert_eq!(
            rendered.body,
            "Dear John Doe, we have received your payment of $100. Thank you."
        );

        let stale = Notification::new(tid("gone"), "user@example.com");
        assert_eq!(stale.template_label(&store), UNKNOWN_TEMPLATE_LABEL);
        assert!(stale.render(&store).is_none());
    }

    #[test]
    fn test_serialization_uses_lowercase_enums() {
        let n = Notification::new(tid("1"), "user@example.com").with_priority(Priority::Low);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["status"], "draft");
        assert_eq!(json["priority"], "low");
        assert_eq!(json["trigger_type"], "manual");
    }
}
