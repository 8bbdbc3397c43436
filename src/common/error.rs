use thiserror::Error;

/// Common application errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Replay configuration errors.
///
/// These are raised before any outgoing call is attempted; a replay that
/// fails on the wire is reported through `ReplayResult::error` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Environment not found: {0}")]
    UnknownEnvironment(String),

    #[error("Custom target requires a URL")]
    MissingCustomUrl,

    #[error("Invalid captured URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid base URL for environment {name}: {url}")]
    InvalidBaseUrl { name: String, url: String },
}

/// Failure reported by an `HttpCaller`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}
