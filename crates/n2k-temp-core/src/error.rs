//! Error types for the temperature mapping feature.

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that keep the feature from activating.
///
/// None of these are fatal to the host: the feature reports a single error
/// notification and stays inactive.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration object was supplied at all
    #[error("Missing configuration")]
    Missing,

    /// Configuration is not a JSON object
    #[error("Configuration must be an object, got {0}")]
    NotAnObject(String),

    /// `temperatureMapping` key is absent or not a list
    #[error("temperatureMapping must be a list of mapping rules")]
    MappingNotAList,

    /// `temperatureMapping` is present but has no rules
    #[error("temperatureMapping must contain at least one rule")]
    EmptyMapping,

    /// A single rule failed the shape check
    #[error("Invalid mapping rule at index {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid_rule(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            index,
            reason: reason.into(),
        }
    }
}
