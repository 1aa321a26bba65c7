//! Outbound message shape and display helpers.

use dunning_core::{Channel, NotificationId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// A rendered notification ready for a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Notification this message was rendered from
    pub notification_id: NotificationId,
    /// Delivery medium
    pub channel: Channel,
    /// Email address or phone number
    pub to: String,
    /// Subject line (email only)
    pub subject: Option<String>,
    /// Message text
    pub body: String,
}

/// Returns a `mailto:` URL for previewing an email message in a local client.
pub fn to_mailto_url(message: &OutboundMessage) -> String {
    let body = urlencoding::encode(&message.body);
    match message.subject.as_deref() {
        Some(subject) => format!(
            "mailto:{}?subject={}&body={}",
            message.to,
            urlencoding::encode(subject),
            body
        ),
        None => format!("mailto:{}?body={}", message.to, body),
    }
}

/// Returns SHA-256 hex of a message body. Log this, never the body itself.
pub fn body_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// Formats a recipient for display: email addresses as-is, the first run of
/// ten digits in a phone number as `(123) 456-7890`.
pub fn format_recipient(recipient: &str, channel: Channel) -> String {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

    match channel {
        Channel::Email => recipient.to_string(),
        Channel::Sms => PHONE_REGEX
            .get_or_init(|| Regex::new(r"(\d{3})(\d{3})(\d{4})").expect("valid regex"))
            .replace(recipient, "($1) $2-$3")
            .into_owned(),
    }
}
