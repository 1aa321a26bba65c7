//! Template data model.

use dunning_core::{Channel, TemplateId, Timestamp};
use serde::{Deserialize, Serialize};

/// Variable names every template can use, whatever it declares.
pub const STANDARD_VARIABLES: [&str; 4] = ["borrower_name", "loan_id", "amount_due", "due_date"];

/// A reusable message skeleton with named placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: TemplateId,
    /// Display name, e.g. "Payment Reminder"
    pub name: String,
    /// Delivery medium
    pub channel: Channel,
    /// Subject line; only meaningful for email
    pub subject: Option<String>,
    /// Message text containing `{{name}}` placeholders
    pub body: String,
    /// Declared variable names, in declaration order
    pub variables: Vec<String>,
    /// When the template was created
    pub created_at: Timestamp,
    /// When the template was last modified
    pub updated_at: Timestamp,
}

impl Template {
    /// Create a template with no subject and no declared variables.
    #[must_use]
    pub fn new(
        id: TemplateId,
        name: impl Into<String>,
        channel: Channel,
        body: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name: name.into(),
            channel,
            subject: None,
            body: body.into(),
            variables: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the declared variables.
    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Set both creation and update timestamps.
    #[must_use]
    pub fn with_timestamp(mut self, at: Timestamp) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}

/// A template rendered against a variable map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    /// Channel of the source template
    pub channel: Channel,
    /// Rendered subject, if the template has one
    pub subject: Option<String>,
    /// Rendered body
    pub body: String,
}
