//! Sent history: notifications bucketed by the calendar day they went out.

use crate::model::Notification;
use chrono::{Local, NaiveDate, TimeZone};
use dunning_core::NotificationStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sent notifications sharing one calendar day, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    /// Calendar day in the zone the grouping was done in
    pub date: NaiveDate,
    /// Notifications sent that day, descending by `sent_at`
    pub notifications: Vec<Notification>,
}

/// Groups sent notifications by the day of `sent_at` in `tz`.
///
/// Notifications that are not `Sent`, or lack `sent_at`, are skipped. Groups
/// are ordered most recent day first; within a group, most recent first with
/// ties kept in input order.
#[must_use]
pub fn group_sent_by_day<Tz: TimeZone>(notifications: &[Notification], tz: &Tz) -> Vec<DayGroup> {
    let mut days: BTreeMap<NaiveDate, Vec<Notification>> = BTreeMap::new();

    for notification in notifications {
        if notification.status != NotificationStatus::Sent {
            continue;
        }
        let Some(sent_at) = notification.sent_at else {
            continue;
        };
        let date = sent_at.as_datetime().with_timezone(tz).date_naive();
        days.entry(date).or_default().push(notification.clone());
    }

    days.into_iter()
        .rev()
        .map(|(date, mut notifications)| {
            // stable: equal timestamps keep input order
            notifications.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
            DayGroup {
                date,
                notifications,
            }
        })
        .collect()
}

/// [`group_sent_by_day`] in the process's local time zone.
#[must_use]
pub fn group_sent_by_day_local(notifications: &[Notification]) -> Vec<DayGroup> {
    group_sent_by_day(notifications, &Local)
}
