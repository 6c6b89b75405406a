use thiserror::Error;

/// Main error type for template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("key not recognized: {key}")]
    KeyNotFound { key: String },

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed environment entry: {0}")]
    MalformedEnv(String),

    #[error("did not confirm")]
    NotConfirmed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoadError(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Prompt failed: {0}")]
    PromptError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TemplateError {
    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    pub fn invalid_value<K: Into<String>, V: Into<String>, R: Into<String>>(
        key: K,
        value: V,
        reason: R,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn malformed_env<S: Into<String>>(entry: S) -> Self {
        Self::MalformedEnv(entry.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn prompt<S: Into<String>>(msg: S) -> Self {
        Self::PromptError(msg.into())
    }
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

