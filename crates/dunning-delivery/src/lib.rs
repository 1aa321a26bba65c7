//! Dunning Delivery - hands rendered notifications to an email or SMS backend.
//!
//! The [`Dispatcher`] trait is the seam to a real provider; this crate ships
//! only [`SimulatedDispatcher`], which waits a configurable delay and reports
//! a fixed outcome. [`Outbox`] ties the pieces together: it renders the
//! notification, dispatches it on its channel, and records the outcome in the
//! [`NotificationStore`](dunning_queue::NotificationStore). It never retries.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dispatcher;
pub mod error;
pub mod message;
pub mod outbox;

pub use dispatcher::{DeliveryOutcome, Dispatcher, SimulatedDispatcher};
pub use error::{DeliveryError, Result};
pub use message::{body_hash, format_recipient, to_mailto_url, OutboundMessage};
pub use outbox::Outbox;
