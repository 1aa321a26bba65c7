//! Dunning Queue - the notification collection and the views built over it.
//!
//! Notifications reference their template by ID only. The channel of a
//! notification is whatever its template says, or email when the template
//! can no longer be found.
//!
//! - [`filter`] narrows a list by status and channel
//! - [`history`] buckets sent notifications by calendar day
//! - [`store`] owns the session's notifications and enforces the status lifecycle
//! - [`compose`] turns a template and a set of recipients into notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod compose;
pub mod error;
pub mod filter;
pub mod history;
pub mod model;
pub mod store;

pub use compose::{compose, default_recipients, ComposeOptions, Recipient};
pub use error::{QueueError, Result};
pub use filter::{filter, resolve_channel, ChannelFilter, StatusFilter};
pub use history::{group_sent_by_day, group_sent_by_day_local, DayGroup};
pub use model::{Notification, UNKNOWN_TEMPLATE_LABEL};
pub use store::NotificationStore;
