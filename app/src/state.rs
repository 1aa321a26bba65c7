//! Application state management.

use dunning_core::AppConfig;
use dunning_delivery::{Outbox, SimulatedDispatcher};
use dunning_queue::{default_recipients, NotificationStore, Recipient};
use dunning_templates::TemplateStore;
use std::sync::Arc;

/// Everything a command needs for one session.
///
/// The stores are in-memory and seeded with the sample data; nothing is
/// persisted between runs.
pub struct AppState {
    pub config: AppConfig,
    pub templates: TemplateStore,
    pub notifications: NotificationStore,
    pub recipients: Vec<Recipient>,
    pub outbox: Outbox,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let templates = TemplateStore::with_defaults();
        let notifications = NotificationStore::with_defaults();
        let dispatcher = SimulatedDispatcher::from_config(&config.delivery);
        let outbox = Outbox::new(
            notifications.clone(),
            templates.clone(),
            Arc::new(dispatcher),
        );

        tracing::debug!(
            templates = templates.count(),
            notifications = notifications.count(),
            "session state seeded"
        );

        Self {
            config,
            templates,
            notifications,
            recipients: default_recipients(),
            outbox,
        }
    }

    /// Look up a borrower by directory ID.
    pub fn recipient(&self, id: &str) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dunning_core::NotificationId;

    #[test]
    fn test_state_shares_stores_with_outbox() {
        let mut config = AppConfig::default();
        config.delivery.simulated_delay_ms = 0;
        let state = AppState::new(config);

        let id = NotificationId::new("2").unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(state.outbox.send_now(&id)).unwrap();

        let stored = state.notifications.get(&id).unwrap();
        assert_eq!(stored.status, dunning_core::NotificationStatus::Sent);
    }

    #[test]
    fn test_recipient_lookup() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.recipient("2").unwrap().name, "Jane Smith");
        assert!(state.recipient("99").is_none());
    }
}
