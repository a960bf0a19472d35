//! Custom error types for the lifecycle automation
//!
//! Reconcile failures are reported through `ReconcileOutcome`, not through
//! these types. These cover the client layer and configuration loading.

use std::fmt;

/// Main error type for the lifecycle automation
#[derive(Debug)]
pub enum LifecycleError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Cluster API communication errors
    Api(ApiError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Cluster API error variants
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Request never produced a response (connect error, deadline expiry)
    Transport { url: String, timed_out: bool, reason: String },

    /// Remote answered with a non-2xx status
    Status { url: String, status: u16, body: String },

    /// Response body could not be decoded
    Decode { url: String, reason: String },

    /// Digest challenge could not be answered
    Auth { url: String, reason: String },
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { timed_out: true, .. })
    }

    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        ApiError::Transport {
            url: url.to_string(),
            timed_out: err.is_timeout(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Config(e) => write!(f, "Configuration error: {}", e),
            LifecycleError::Api(e) => write!(f, "Cluster API error: {}", e),
            LifecycleError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport {
                url,
                timed_out: true,
                reason,
            } => write!(f, "Request to {} timed out: {}", url, reason),
            ApiError::Transport { url, reason, .. } => {
                write!(f, "Request to {} failed: {}", url, reason)
            }
            ApiError::Status { url, status, body } => {
                write!(f, "{} returned status {}: {}", url, status, body)
            }
            ApiError::Decode { url, reason } => {
                write!(f, "Invalid response from {}: {}", url, reason)
            }
            ApiError::Auth { url, reason } => {
                write!(f, "Digest authentication failed for {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for LifecycleError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ApiError {}

impl From<anyhow::Error> for LifecycleError {
    fn from(err: anyhow::Error) -> Self {
        LifecycleError::Other(err.to_string())
    }
}

impl From<ConfigError> for LifecycleError {
    fn from(err: ConfigError) -> Self {
        LifecycleError::Config(err)
    }
}

impl From<ApiError> for LifecycleError {
    fn from(err: ApiError) -> Self {
        LifecycleError::Api(err)
    }
}
