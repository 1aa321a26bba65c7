//! In-memory template store with lookup by ID and channel.

use crate::{
    error::{Result, TemplateError},
    model::Template,
    render::undeclared_placeholders,
};
use dunning_core::{Channel, TemplateId, Timestamp};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Resolves a template reference that may be stale.
///
/// Implemented by [`TemplateStore`] and by any `Fn(&TemplateId) -> Option<Template>`,
/// so tests and callers can inject a lookup without a store.
pub trait TemplateLookup {
    /// Look up a template; `None` when the ID no longer resolves.
    fn lookup(&self, id: &TemplateId) -> Option<Template>;
}

impl<F> TemplateLookup for F
where
    F: Fn(&TemplateId) -> Option<Template>,
{
    fn lookup(&self, id: &TemplateId) -> Option<Template> {
        self(id)
    }
}

/// Session-owned collection of templates.
///
/// Cloning the store shares the underlying collection. Insertion order is
/// kept so listings are stable.
#[derive(Clone, Default)]
pub struct TemplateStore {
    templates: Arc<RwLock<Vec<Template>>>,
}

impl TemplateStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the built-in payment templates.
    #[must_use]
    pub fn with_defaults() -> Self {
        let store = Self::new();
        {
            let mut cache = store
                .templates
                .write()
                .expect("acquire write lock on templates");
            cache.extend(default_templates());
        }
        store
    }

    /// Get a template by ID.
    #[must_use]
    pub fn get(&self, id: &TemplateId) -> Option<Template> {
        let cache = self
            .templates
            .read()
            .expect("acquire read lock on templates");

        cache.iter().find(|t| &t.id == id).cloned()
    }

    /// List templates, optionally restricted to one channel.
    ///
    /// Without a filter, email templates come first, then SMS templates.
    #[must_use]
    pub fn list(&self, channel: Option<Channel>) -> Vec<Template> {
        let cache = self
            .templates
            .read()
            .expect("acquire read lock on templates");

        match channel {
            Some(channel) => cache
                .iter()
                .filter(|t| t.channel == channel)
                .cloned()
                .collect(),
            None => {
                let (mut emails, sms): (Vec<Template>, Vec<Template>) = cache
                    .iter()
                    .cloned()
                    .partition(|t| t.channel == Channel::Email);
                emails.extend(sms);
                emails
            }
        }
    }

    /// Number of templates in the store.
    #[must_use]
    pub fn count(&self) -> usize {
        self.templates
            .read()
            .expect("acquire read lock on templates")
            .len()
    }

    /// Add a template.
    ///
    /// Placeholders that are neither declared nor standard are logged, not rejected.
    ///
    /// # Errors
    /// Returns error if the template is invalid or its ID is taken.
    pub fn insert(&self, template: Template) -> Result<()> {
        validate(&template)?;

        let mut cache = self
            .templates
            .write()
            .expect("acquire write lock on templates");

        if cache.iter().any(|t| t.id == template.id) {
            return Err(TemplateError::Duplicate {
                template_id: template.id.to_string(),
            });
        }

        info!(template_id = %template.id, channel = %template.channel, "added template");
        cache.push(template);
        Ok(())
    }

    /// Replace an existing template, bumping its update time.
    ///
    /// # Errors
    /// Returns error if the template is invalid or not in the store.
    pub fn update(&self, mut template: Template) -> Result<()> {
        validate(&template)?;

        let mut cache = self
            .templates
            .write()
            .expect("acquire write lock on templates");

        let slot = cache
            .iter_mut()
            .find(|t| t.id == template.id)
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template.id.to_string(),
            })?;

        template.created_at = slot.created_at;
        template.updated_at = Timestamp::now();
        info!(template_id = %template.id, "updated template");
        *slot = template;
        Ok(())
    }

    /// Remove a template. Notifications referencing it are left dangling.
    ///
    /// Returns the removed template, if it existed.
    pub fn remove(&self, id: &TemplateId) -> Option<Template> {
        let mut cache = self
            .templates
            .write()
            .expect("acquire write lock on templates");

        let index = cache.iter().position(|t| &t.id == id)?;
        info!(template_id = %id, "removed template");
        Some(cache.remove(index))
    }
}

impl TemplateLookup for TemplateStore {
    fn lookup(&self, id: &TemplateId) -> Option<Template> {
        self.get(id)
    }
}

fn validate(template: &Template) -> Result<()> {
    let invalid = |reason: &str| TemplateError::Invalid {
        template_id: template.id.to_string(),
        reason: reason.to_string(),
    };

    if template.name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if template.body.trim().is_empty() {
        return Err(invalid("body must not be empty"));
    }
    if template.channel == Channel::Email
        && template
            .subject
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
    {
        return Err(invalid("email templates need a subject"));
    }

    let undeclared = undeclared_placeholders(template);
    if !undeclared.is_empty() {
        warn!(
            template_id = %template.id,
            placeholders = ?undeclared,
            "template uses undeclared placeholders"
        );
    }

    Ok(())
}

fn seeded(id: &str, day: u32, name: &str, channel: Channel, body: &str) -> Template {
    let created = chrono::NaiveDate::from_ymd_opt(2023, 1, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Timestamp::from_datetime(dt.and_utc()))
        .unwrap_or_default();

    Template::new(
        TemplateId::new(id).expect("valid built-in template ID"),
        name,
        channel,
        body,
    )
    .with_variables(["name", "amount", "dueDate"])
    .with_timestamp(created)
}

fn default_templates() -> Vec<Template> {
    vec![
        seeded(
            "1",
            1,
            "Payment Reminder",
            Channel::Email,
            "Dear {{name}}, this is a reminder that your payment of {{amount}} is due on {{dueDate}}.",
        )
        .with_subject("Your payment is due soon"),
        seeded(
            "2",
            2,
            "Payment Overdue",
            Channel::Email,
            "Dear {{name}}, your payment of {{amount}} was due on {{dueDate}} and is now overdue. Please make your payment as soon as possible.",
        )
        .with_subject("Your payment is overdue"),
        seeded(
            "3",
            3,
            "Payment Confirmation",
            Channel::Email,
            "Dear {{name}}, we have received your payment of {{amount}}. Thank you.",
        )
        .with_subject("Payment Confirmation")
        .with_variables(["name", "amount"]),
        seeded(
            "4",
            4,
            "SMS Payment Reminder",
            Channel::Sms,
            "Hi {{name}}, reminder: payment of {{amount}} due on {{dueDate}}.",
        ),
        seeded(
            "5",
            5,
            "SMS Payment Overdue",
            Channel::Sms,
            "Hi {{name}}, your payment of {{amount}} due on {{dueDate}} is overdue. Please pay ASAP.",
        ),
    ]
}
