//! Dunning Core - Foundation crate for the Dunning notification engine.
//!
//! This crate provides shared types, error handling and configuration
//! management that the template, queue and delivery crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and delivery service settings
//! - [`types`] - Shared newtypes and enums (`TemplateId`, `NotificationId`, `Channel`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use dunning_core::{AppConfig, Channel};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.delivery.simulated_delay_ms, 1000);
//! assert_eq!(Channel::default(), Channel::Email);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    is_email_address, is_phone_number, AppConfig, DeliveryConfig, EmailServiceConfig,
    GeneralConfig, SmsServiceConfig,
};
pub use error::{ConfigError, ConfigResult, DunningError, Result};
pub use types::{
    Channel, NotificationId, NotificationStatus, Priority, TemplateId, Timestamp, TriggerType,
};
