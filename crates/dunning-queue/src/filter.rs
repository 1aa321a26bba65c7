//! Status and channel filtering over a notification list.

use crate::model::Notification;
use dunning_core::{Channel, DunningError, NotificationStatus};
use dunning_templates::TemplateLookup;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Status predicate: everything, or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    /// No restriction
    #[default]
    All,
    /// Only notifications in this status
    Only(NotificationStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter.
    #[must_use]
    pub fn matches(&self, status: NotificationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Channel predicate: everything, or one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelFilter {
    /// No restriction
    #[default]
    All,
    /// Only notifications resolving to this channel
    Only(Channel),
}

impl ChannelFilter {
    /// Whether `channel` passes the filter.
    #[must_use]
    pub fn matches(&self, channel: Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(wanted) => *wanted == channel,
        }
    }
}

impl FromStr for ChannelFilter {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelFilter::All => f.write_str("all"),
            ChannelFilter::Only(channel) => write!(f, "{channel}"),
        }
    }
}

/// Channel of the notification's template; email when the template is gone.
#[must_use]
pub fn resolve_channel<L: TemplateLookup + ?Sized>(notification: &Notification, lookup: &L) -> Channel {
    if let Some(template) = lookup.lookup(&notification.template_id) {
        template.channel
    } else {
        debug!(
            notification_id = %notification.id,
            template_id = %notification.template_id,
            "template not found, defaulting channel to email"
        );
        Channel::Email
    }
}

/// Notifications passing both predicates, in their original order.
#[must_use]
pub fn filter<L: TemplateLookup + ?Sized>(
    notifications: &[Notification],
    status: StatusFilter,
    channel: ChannelFilter,
    lookup: &L,
) -> Vec<Notification> {
    notifications
        .iter()
        .filter(|n| status.matches(n.status))
        .filter(|n| channel == ChannelFilter::All || channel.matches(resolve_channel(*n, lookup)))
        .cloned()
        .collect()
}
