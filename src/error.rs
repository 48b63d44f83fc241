use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the scheduler service
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Validation error: {0}")]
    #[diagnostic(code(scheduler::validation))]
    Validation(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(scheduler::not_found))]
    NotFound(String),

    #[error("Store error: {0}")]
    #[diagnostic(code(scheduler::store))]
    Store(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(scheduler::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(scheduler::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(scheduler::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(scheduler::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(scheduler::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SchedulerResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create not-found errors
pub fn not_found_error(collection: &str, id: &str) -> Error {
    Error::NotFound(format!("{} document '{}' does not exist", collection, id))
}

/// Helper to create store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}
