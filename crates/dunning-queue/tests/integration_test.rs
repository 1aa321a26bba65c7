//! Integration tests for the notification queue
//!
//! Exercises filtering and sent-history grouping over the seeded store,
//! including notifications whose template has since been deleted.

use chrono::{NaiveDate, Utc};
use dunning_core::{Channel, NotificationId, NotificationStatus, TemplateId, Timestamp};
use dunning_queue::{
    compose, default_recipients, group_sent_by_day, resolve_channel, ChannelFilter,
    ComposeOptions, Notification, NotificationStore, StatusFilter, UNKNOWN_TEMPLATE_LABEL,
};
use dunning_templates::TemplateStore;

fn ts(s: &str) -> Timestamp {
    Timestamp::from_rfc3339(s).unwrap()
}

fn sent(id: &str, template: &str, at: &str) -> Notification {
    Notification::new(TemplateId::new(template).unwrap(), "user@example.com")
        .with_id(NotificationId::new(id).unwrap())
        .delivered_at(ts(at))
}

#[test]
fn test_queue_views_over_defaults() {
    let templates = TemplateStore::with_defaults();
    let store = NotificationStore::with_defaults();

    let all = store.filtered(StatusFilter::All, ChannelFilter::All, &templates);
    assert_eq!(all.len(), 2);

    let scheduled_sms = store.filtered(
        StatusFilter::Only(NotificationStatus::Scheduled),
        ChannelFilter::Only(Channel::Sms),
        &templates,
    );
    assert_eq!(scheduled_sms.len(), 1);
    assert_eq!(scheduled_sms[0].id.as_str(), "2");

    let sent_sms = store.filtered(
        StatusFilter::Only(NotificationStatus::Sent),
        ChannelFilter::Only(Channel::Sms),
        &templates,
    );
    assert!(sent_sms.is_empty());
}

#[test]
fn test_deleted_template_falls_back_to_email() {
    let templates = TemplateStore::with_defaults();
    let store = NotificationStore::with_defaults();
    assert!(templates.remove(&TemplateId::new("4").unwrap()).is_some());

    let sms_only = store.filtered(StatusFilter::All, ChannelFilter::Only(Channel::Sms), &templates);
    assert!(sms_only.is_empty());

    let orphan = store.get(&NotificationId::new("2").unwrap()).unwrap();
    assert_eq!(resolve_channel(&orphan, &templates), Channel::Email);
    assert_eq!(orphan.template_label(&templates), UNKNOWN_TEMPLATE_LABEL);
    assert!(orphan.render(&templates).is_none());
}

#[test]
fn test_history_after_sends() {
    let templates = TemplateStore::with_defaults();
    let store = NotificationStore::with_defaults();
    store
        .mark_sent(&NotificationId::new("2").unwrap(), ts("2023-02-10T09:30:00Z"))
        .unwrap();
    store.insert(sent("3", "5", "2023-02-10T17:00:00Z")).unwrap();
    store.insert(sent("4", "2", "2023-01-25T08:00:00Z")).unwrap();

    let sms = store.filtered(StatusFilter::All, ChannelFilter::Only(Channel::Sms), &templates);
    let groups = group_sent_by_day(&sms, &Utc);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
    let ids: Vec<&str> = groups[0].notifications.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2"]);

    let groups = group_sent_by_day(&store.all(), &Utc);
    let days: Vec<NaiveDate> = groups.iter().map(|g| g.date).collect();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2023, 2, 10).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 25).unwrap(),
        ]
    );
    assert_eq!(groups[1].notifications.len(), 2);
}

#[test]
fn test_composed_notifications_join_queue() {
    let templates = TemplateStore::with_defaults();
    let store = NotificationStore::with_defaults();
    let template = templates.get(&TemplateId::new("5").unwrap()).unwrap();

    let composed = compose(&template, &default_recipients(), &ComposeOptions::default()).unwrap();
    assert_eq!(composed.len(), 5);
    store.insert_all(composed).unwrap();

    let drafts = store.filtered(
        StatusFilter::Only(NotificationStatus::Draft),
        ChannelFilter::Only(Channel::Sms),
        &templates,
    );
    assert_eq!(drafts.len(), 5);
    let rendered = drafts[0].render(&templates).unwrap();
    assert!(rendered.body.starts_with("Hi John Doe,"));
}
