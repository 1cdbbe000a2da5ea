//! Core error types for usage-normalizer-core.
//!
//! Validation failures live in [`NormalizeError`] so a batch report can carry
//! them per entry. Everything else rolls up into [`CoreError`].

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Core error type for usage-normalizer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input validation errors
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors raised while turning usage entries into intervals.
///
/// These are plain data: cloneable, comparable and serializable, so a
/// [`crate::NormalizationReport`] can list them next to the skipped entry.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeError {
    /// A date string is not `YYYY-MM-DD`
    #[error("Invalid date format for '{field}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDateFormat { field: String, value: String },

    /// Energy total is negative, NaN or infinite
    #[error("Invalid energy total: {value} kWh must be finite and non-negative")]
    InvalidTotal { value: f64 },

    /// A month, cutoff day or date range is out of bounds
    #[error("Invalid range for '{field}': {message}")]
    InvalidRange { field: String, message: String },
}

impl NormalizeError {
    pub fn date_format(field: &str, value: &str) -> Self {
        NormalizeError::InvalidDateFormat {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn range(field: &str, message: impl Into<String>) -> Self {
        NormalizeError::InvalidRange {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::InvalidDateFormat { .. } => "invalid_date_format",
            NormalizeError::InvalidTotal { .. } => "invalid_total",
            NormalizeError::InvalidRange { .. } => "invalid_range",
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
