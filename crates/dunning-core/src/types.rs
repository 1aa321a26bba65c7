//! Shared types used across the Dunning engine.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::DunningError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Identifiers are 1-64 characters of ASCII letters, digits, `-` or `_`.
fn validate_id(kind: &str, id: &str) -> Result<(), DunningError> {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        ID_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid regex"));

    if regex.is_match(id) {
        Ok(())
    } else {
        Err(DunningError::Validation(format!(
            "invalid {kind} ID: must be 1-64 alphanumeric, '-' or '_' characters, got '{id}'"
        )))
    }
}

/// Newtype for template identifiers with validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a new `TemplateId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains unsupported characters.
    pub fn new(id: impl Into<String>) -> Result<Self, DunningError> {
        let id = id.into();
        validate_id("template", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for notification identifiers with validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(String);

impl NotificationId {
    /// Create a new `NotificationId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains unsupported characters.
    pub fn new(id: impl Into<String>) -> Result<Self, DunningError> {
        let id = id.into();
        validate_id("notification", &id)?;
        Ok(Self(id))
    }

    /// Create a new random `NotificationId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery medium of a template and the notifications built from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Email message (subject + body)
    #[default]
    Email,
    /// SMS text message (body only)
    Sms,
}

impl Channel {
    /// Lowercase wire name of the channel.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    /// Human-readable label, as shown on queue cards.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            other => Err(DunningError::Validation(format!(
                "unknown channel '{other}': expected 'email' or 'sms'"
            ))),
        }
    }
}

/// Priority of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority
    Low,
    /// Medium priority
    #[default]
    Medium,
    /// High priority
    High,
}

impl Priority {
    /// Lowercase wire name of the priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(DunningError::Validation(format!(
                "unknown priority '{other}': expected 'low', 'medium' or 'high'"
            ))),
        }
    }
}

/// Lifecycle state of a notification.
///
/// ```text
/// draft ──► scheduled ──► sent
///   │           │
///   ├──► sent   └──► failed
///   └──► failed
/// ```
///
/// `sent` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Composed but not yet queued
    Draft,
    /// Queued for a future send
    Scheduled,
    /// Delivered by the delivery layer
    Sent,
    /// The delivery layer reported failure
    Failed,
}

impl NotificationStatus {
    /// Lowercase wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is defined from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Scheduled | Self::Sent | Self::Failed)
                | (Self::Scheduled, Self::Sent | Self::Failed)
        )
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(DunningError::Validation(format!(
                "unknown status '{other}': expected draft, scheduled, sent or failed"
            ))),
        }
    }
}

/// What created a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    /// Composed by an operator
    #[default]
    Manual,
    /// Produced by an automated collection rule
    Automatic,
}

impl TriggerType {
    /// Human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Automatic => "Automatic",
        }
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, DunningError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| DunningError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_valid() {
        for id in ["1", "payment-reminder", "tpl_42", "550e8400-e29b-41d4-a716-446655440000"] {
            assert!(TemplateId::new(id).is_ok(), "Failed for: {id}");
            assert!(NotificationId::new(id).is_ok(), "Failed for: {id}");
        }
    }

    #[test]
    fn test_ids_invalid() {
        let too_long = "a".repeat(65);
        for id in ["", "has space", "slash/id", "{{id}}", too_long.as_str()] {
            assert!(TemplateId::new(id).is_err(), "Should fail for: {id}");
            assert!(NotificationId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let id1 = NotificationId::generate();
        let id2 = NotificationId::generate();
        assert_ne!(id1, id2);
        assert!(NotificationId::new(id1.as_str()).is_ok());
    }

    #[test]
    fn test_channel_parse_and_display() {
        assert_eq!("email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
        assert!("fax".parse::<Channel>().is_err());
        assert_eq!(Channel::Sms.to_string(), "sms");
        assert_eq!(Channel::Sms.display_name(), "SMS");
    }

    #[test]
    fn test_status_transitions() {
        use NotificationStatus::{Draft, Failed, Scheduled, Sent};

        assert!(Draft.can_transition_to(Scheduled));
        assert!(Draft.can_transition_to(Sent));
        assert!(Scheduled.can_transition_to(Sent));
        assert!(Scheduled.can_transition_to(Failed));

        assert!(!Sent.can_transition_to(Failed));
        assert!(!Sent.can_transition_to(Draft));
        assert!(!Failed.can_transition_to(Sent));
        assert!(!Scheduled.can_transition_to(Draft));

        assert!(Sent.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Draft.is_terminal());
    }

    #[test]
    fn test_enum_serialization() {
        let json = serde_json::to_string(&NotificationStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: TriggerType = serde_json::from_str("\"automatic\"").unwrap();
        assert_eq!(parsed, TriggerType::Automatic);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::from_rfc3339("2023-01-25T09:00:00Z").expect("parse RFC3339 timestamp");
        assert_eq!(ts.to_rfc3339(), "2023-01-25T09:00:00+00:00");
        assert!(Timestamp::from_rfc3339("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_ordering() {
        let early = Timestamp::from_rfc3339("2024-01-01T09:00:00Z").unwrap();
        let late = Timestamp::from_rfc3339("2024-01-01T14:00:00Z").unwrap();
        assert!(late > early);
    }
}
