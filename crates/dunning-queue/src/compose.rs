//! Composer: one notification per recipient from a chosen template.

use crate::{
    error::{QueueError, Result},
    model::Notification,
};
use dunning_core::{Channel, Priority, Timestamp, TriggerType};
use dunning_templates::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Someone a notification can be addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Identifier in the borrower directory
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address, if known
    pub email: Option<String>,
    /// Phone number, if known
    pub phone: Option<String>,
}

impl Recipient {
    /// The address to use on `channel`, if the recipient has one.
    #[must_use]
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.phone.as_deref(),
        }
        .filter(|a| !a.trim().is_empty())
    }
}

/// Options shared by every notification a compose call produces.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// Priority
    pub priority: Priority,
    /// Manual or automatic origin
    pub trigger_type: TriggerType,
    /// Schedule instead of leaving as a draft
    pub scheduled_at: Option<Timestamp>,
    /// Values bound to placeholders for every recipient
    pub variables: HashMap<String, String>,
}

/// Builds one notification per recipient on the template's channel.
///
/// Recipients without an address on that channel are skipped. Each
/// notification gets `borrower_name` (and `name`, if the template declares
/// it) bound to the recipient's name unless the caller already supplied it. The result is `Scheduled` when
/// `options.scheduled_at` is set, otherwise `Draft`.
///
/// # Errors
/// Returns error if there are no recipients, the template body is empty, or
/// no recipient can be addressed on the template's channel.
pub fn compose(
    template: &Template,
    recipients: &[Recipient],
    options: &ComposeOptions,
) -> Result<Vec<Notification>> {
    if template.body.trim().is_empty() {
        return Err(QueueError::Invalid("message body is empty".to_string()));
    }
    if recipients.is_empty() {
        return Err(QueueError::Invalid(
            "at least one recipient is required".to_string(),
        ));
    }

    let mut notifications = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let Some(address) = recipient.address_for(template.channel) else {
            warn!(
                recipient_id = %recipient.id,
                channel = %template.channel,
                "recipient has no address for channel, skipping"
            );
            continue;
        };

        let mut notification = Notification::new(template.id.clone(), address)
            .with_priority(options.priority)
            .with_trigger(options.trigger_type);
        notification.variables.clone_from(&options.variables);
        notification
            .variables
            .entry("borrower_name".to_string())
            .or_insert_with(|| recipient.name.clone());
        if template.variables.iter().any(|v| v == "name") {
            notification
                .variables
                .entry("name".to_string())
                .or_insert_with(|| recipient.name.clone());
        }

        if let Some(at) = options.scheduled_at {
            notification = notification.scheduled_for(at);
        }
        notifications.push(notification);
    }

    if notifications.is_empty() {
        return Err(QueueError::Invalid(format!(
            "no recipient has a {} address",
            template.channel
        )));
    }
    Ok(notifications)
}

/// Borrower directory used when no external one is wired in.
#[must_use]
pub fn default_recipients() -> Vec<Recipient> {
    [
        ("1", "John Doe", "john@example.com", "+1234567890"),
        ("2", "Jane Smith", "jane@example.com", "+1987654321"),
        ("3", "Alice Johnson", "alice@example.com", "+1122334455"),
        ("4", "Bob Williams", "bob@example.com", "+1555666777"),
        ("5", "Charlie Brown", "charlie@example.com", "+1888999000"),
    ]
    .into_iter()
    .map(|(id, name, email, phone)| Recipient {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dunning_core::{NotificationStatus, TemplateId};

    fn sms_template() -> Template {
        Template::new(
            TemplateId::new("4").unwrap(),
            "SMS Payment Reminder",
            Channel::Sms,
            "Hi {{borrower_name}}, {{amount_due}} is due.",
        )
    }

    #[test]
    fn test_one_notification_per_recipient() {
        let recipients = default_recipients();
        let notifications =
            compose(&sms_template(), &recipients[..2], &ComposeOptions::default()).unwrap();

        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].recipient, "+1234567890");
        assert_eq!(notifications[1].recipient, "+1987654321");
        assert_eq!(notifications[0].status, NotificationStatus::Draft);
        assert_eq!(
            notifications[1].variables.get("borrower_name").map(String::as_str),
            Some("Jane Smith")
        );
        assert_ne!(notifications[0].id, notifications[1].id);
    }

    #[test]
    fn test_scheduled_and_caller_variables_win() {
        let at = Timestamp::from_rfc3339("2024-06-01T09:00:00Z").unwrap();
        let options = ComposeOptions {
            priority: Priority::High,
            scheduled_at: Some(at),
            variables: HashMap::from([
                ("borrower_name".to_string(), "Mr. Doe".to_string()),
                ("amount_due".to_string(), "$75".to_string()),
            ]),
            ..ComposeOptions::default()
        };

        let notifications = compose(&sms_template(), &default_recipients()[..1], &options).unwrap();
        let n = &notifications[0];
        assert_eq!(n.status, NotificationStatus::Scheduled);
        assert_eq!(n.scheduled_at, Some(at));
        assert_eq!(n.priority, Priority::High);
        assert_eq!(n.variables["borrower_name"], "Mr. Doe");
        assert_eq!(n.variables["amount_due"], "$75");
    }

    #[test]
    fn test_skips_recipients_without_address() {
        let mut recipients = default_recipients();
        recipients[0].phone = None;
        recipients[1].phone = Some(String::new());

        let notifications =
            compose(&sms_template(), &recipients[..3], &ComposeOptions::default()).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient, "+1122334455");
    }

    #[test]
    fn test_rejects_empty_inputs() {
        assert!(compose(&sms_template(), &[], &ComposeOptions::default()).is_err());

        let mut blank = sms_template();
        blank.body = " ".to_string();
        assert!(compose(&blank, &default_recipients(), &ComposeOptions::default()).is_err());

        let unreachable = Recipient {
            id: "9".to_string(),
            name: "No Phone".to_string(),
            email: Some("np@example.com".to_string()),
            phone: None,
        };
        assert!(matches!(
            compose(&sms_template(), &[unreachable], &ComposeOptions::default()),
            Err(QueueError::Invalid(_))
        ));
    }

    #[test]
    fn test_declared_name_variable_bound() {
        let template = sms_template().with_variables(["name", "amount"]);
        let notifications =
            compose(&template, &default_recipients()[3..4], &ComposeOptions::default()).unwrap();
        assert_eq!(notifications[0].variables["name"], "Bob Williams");

        let undeclared =
            compose(&sms_template(), &default_recipients()[3..4], &ComposeOptions::default())
                .unwrap();
        assert!(!undeclared[0].variables.contains_key("name"));
    }

    #[test]
    fn test_address_for_channel() {
        let r = &default_recipients()[2];
        assert_eq!(r.address_for(Channel::Email), Some("alice@example.com"));
        assert_eq!(r.address_for(Channel::Sms), Some("+1122334455"));
    }
}
