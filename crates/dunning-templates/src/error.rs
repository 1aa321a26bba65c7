//! Template error types.

use dunning_core::DunningError;
use thiserror::Error;

/// Error types for template store operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template with this ID already exists.
    #[error("template already exists: {template_id}")]
    Duplicate {
        /// The conflicting ID
        template_id: String,
    },

    /// Template not found in the store.
    #[error("template not found: {template_id}")]
    NotFound {
        /// The missing ID
        template_id: String,
    },

    /// Template failed validation.
    #[error("invalid template {template_id}: {reason}")]
    Invalid {
        /// The offending template
        template_id: String,
        /// What is wrong with it
        reason: String,
    },
}

impl From<TemplateError> for DunningError {
    fn from(err: TemplateError) -> Self {
        DunningError::Template(err.to_string())
    }
}

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
