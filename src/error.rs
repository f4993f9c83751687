//! Error types for the task engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while analyzing tasks or loading rules.
///
/// Engine operations are pure, so every error here is a precondition
/// violation or a bad rules/config file. Nothing is worth retrying
/// without changing the input.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input text or snapshot is empty or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rule tables failed validation.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// A collaborator could not find the requested record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML or YAML could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
