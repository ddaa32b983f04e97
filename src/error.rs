use miette::{Diagnostic, Result};
use thiserror::Error;

/// How an API call failed, as observed at the client boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The backend answered 2xx but with `success: false`
    Rejected,
    /// Non-success HTTP status
    Http(u16),
    /// Transport failure before any response arrived
    Transport,
    /// The response body did not match the envelope shape
    Decode,
}

/// A failed API call with its normalized, human-readable message
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiFailure {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiFailure {
    /// Backend rejected the request (`success: false`)
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Rejected,
            message: message.into(),
        }
    }

    /// Non-2xx HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Http(status),
            message: message.into(),
        }
    }

    /// Request never produced a response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: message.into(),
        }
    }

    /// Response arrived but could not be decoded
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: message.into(),
        }
    }
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(garagehours::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(garagehours::config))]
    Config(String),

    #[error("Validation error: {0}")]
    #[diagnostic(code(garagehours::validation))]
    Validation(String),

    #[error("Schedule API error: {0}")]
    #[diagnostic(code(garagehours::api))]
    Api(#[from] ApiFailure),

    #[error(transparent)]
    #[diagnostic(code(garagehours::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(garagehours::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(garagehours::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type GarageResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
