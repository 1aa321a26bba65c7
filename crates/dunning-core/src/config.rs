//! Configuration management for Dunning.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The email and SMS sections hold the
//! delivery service settings edited on the settings screen.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/dunning/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Delivery layer behaviour
    pub delivery: DeliveryConfig,
    /// Email service settings
    pub email: EmailServiceConfig,
    /// SMS service settings
    pub sms: SmsServiceConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `DUNNING_SEND_DELAY_MS`: Override the simulated send delay
    /// - `DUNNING_EMAIL_API_KEY`: Email service API key
    /// - `DUNNING_SMS_API_KEY`: SMS service API key
    pub fn load_with_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DUNNING_SEND_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                self.delivery.simulated_delay_ms = ms;
                tracing::debug!("Override delivery.simulated_delay_ms from env: {}", ms);
            }
        }

        if let Some(key) = lookup("DUNNING_EMAIL_API_KEY") {
            self.email.api_key = key;
            tracing::debug!("Override email.api_key from env");
        }

        if let Some(key) = lookup("DUNNING_SMS_API_KEY") {
            self.sms.api_key = key;
            tracing::debug!("Override sms.api_key from env");
        }
    }

    /// Validate all sections.
    pub fn validate(&self) -> ConfigResult<()> {
        self.general.validate()?;
        self.email.validate()?;
        self.sms.validate()?;
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    ///
    /// Creates the parent directory if it doesn't exist. API keys are not written.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/dunning/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "dunning", "dunning").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Zone used to bucket the sent history by day: "local" or "utc"
    pub history_timezone: String,
}

impl GeneralConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.history_timezone.as_str() {
            "local" | "utc" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "general.history_timezone".to_string(),
                reason: format!("expected 'local' or 'utc', got '{other}'"),
            }),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_timezone: "local".to_string(),
        }
    }
}

/// Delivery layer behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Delay before a simulated send resolves, in milliseconds
    pub simulated_delay_ms: u64,
    /// Make every simulated send report failure
    pub simulate_failure: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 1000,
            simulate_failure: false,
        }
    }
}

/// Email service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailServiceConfig {
    /// Provider name, e.g. "SendGrid" or "Amazon SES"
    pub service_provider: String,
    /// Provider API key (read from config or env, never written back)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl EmailServiceConfig {
    /// Whether enough is set to attempt a connection.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.service_provider.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.from_email.trim().is_empty()
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.from_email.is_empty() && !is_email_address(&self.from_email) {
            return Err(ConfigError::InvalidValue {
                field: "email.from_email".to_string(),
                reason: format!("'{}' is not an email address", self.from_email),
            });
        }
        Ok(())
    }
}

/// SMS service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsServiceConfig {
    /// Provider name, e.g. "Twilio"
    pub service_provider: String,
    /// Provider API key (read from config or env, never written back)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Sender number
    pub from_number: String,
}

impl SmsServiceConfig {
    /// Whether enough is set to attempt a connection.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.service_provider.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.from_number.trim().is_empty()
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.from_number.is_empty() && !is_phone_number(&self.from_number) {
            return Err(ConfigError::InvalidValue {
                field: "sms.from_number".to_string(),
                reason: format!("'{}' is not a phone number", self.from_number),
            });
        }
        Ok(())
    }
}

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is hardcoded and valid"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex is hardcoded and valid"));

/// Loose address check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn is_email_address(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Optional leading `+` followed by 7-15 digits.
#[must_use]
pub fn is_phone_number(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.general.history_timezone, "local");
        assert_eq!(config.delivery.simulated_delay_ms, 1000);
        assert!(!config.delivery.simulate_failure);
        assert!(!config.email.is_configured());
        assert!(!config.sms.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_omits_api_keys() {
        let mut config = AppConfig::default();
        config.email.api_key = "secret-email-key".to_string();
        config.sms.api_key = "secret-sms-key".to_string();

        let toml_str = toml::to_string_pretty(&config).expect("serialize config");
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[delivery]"));
        assert!(toml_str.contains("[email]"));
        assert!(!toml_str.contains("secret-email-key"));
        assert!(!toml_str.contains("secret-sms-key"));
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.email.service_provider = "SendGrid".to_string();
        config.email.from_email = "noreply@lender.example".to_string();
        config.sms.from_number = "+1234567890".to_string();
        config.delivery.simulated_delay_ms = 10;

        config.save_to(&config_path).expect("save config");
        let loaded = AppConfig::load_from(&config_path).expect("load config");

        assert_eq!(loaded.email.service_provider, "SendGrid");
        assert_eq!(loaded.email.from_email, "noreply@lender.example");
        assert_eq!(loaded.sms.from_number, "+1234567890");
        assert_eq!(loaded.delivery.simulated_delay_ms, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.delivery.simulated_delay_ms, 1000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DUNNING_SEND_DELAY_MS", "25"),
            ("DUNNING_EMAIL_API_KEY", "email-key"),
            ("DUNNING_SMS_API_KEY", "sms-key"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.delivery.simulated_delay_ms, 25);
        assert_eq!(config.email.api_key, "email-key");
        assert_eq!(config.sms.api_key, "sms-key");
    }

    #[test]
    fn test_env_override_ignores_unparseable_delay() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| {
            (key == "DUNNING_SEND_DELAY_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.delivery.simulated_delay_ms, 1000);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[email]
service_provider = "Amazon SES"
api_key = "from-file"
from_email = "billing@lender.example"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.email.service_provider, "Amazon SES");
        assert!(config.email.is_configured());
        // These should be defaults
        assert_eq!(config.delivery.simulated_delay_ms, 1000);
        assert_eq!(config.general.history_timezone, "local");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.email.from_email = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "email.from_email"
        ));

        let mut config = AppConfig::default();
        config.sms.from_number = "call me".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.general.history_timezone = "mars".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_address_helpers() {
        assert!(is_email_address("user@example.com"));
        assert!(!is_email_address("user@example"));
        assert!(!is_email_address("two@@example.com"));
        assert!(is_phone_number("+1234567890"));
        assert!(is_phone_number("5551234567"));
        assert!(!is_phone_number("555-1234"));
    }
}
