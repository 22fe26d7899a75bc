//! Error types for Healthprint

use thiserror::Error;

/// Errors that can occur while preparing or running an analysis
#[derive(Debug, Error)]
pub enum HealthprintError {
    #[error("Invalid profile field `{field}`: {reason}")]
    InvalidProfile { field: String, reason: String },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HealthprintError {
    pub(crate) fn invalid_profile(field: &str, reason: impl Into<String>) -> Self {
        HealthprintError::InvalidProfile {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
