//! Error types for the infrasync plan tool.
//!
//! Errors only come from the collaborators around the comparison engine:
//! loading the desired configuration and fetching the current state. The
//! engine itself is total over well-formed input and never fails.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for infrasync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Current state retrieval errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Two resources share the same identity key.
    #[error("Duplicate resource: {key}")]
    DuplicateResource {
        /// The duplicated `type.name` key.
        key: String,
    },

    /// Resource type is not in the allow-list.
    #[error("Unsupported resource type '{resource_type}' at {field}")]
    UnsupportedType {
        /// The rejected type.
        resource_type: String,
        /// Field path of the offending resource.
        field: String,
    },
}

/// Current state retrieval errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// State source does not exist.
    #[error("State source not found: {path}")]
    NotFound {
        /// Path to the missing state file.
        path: PathBuf,
    },

    /// State could not be read or parsed.
    #[error("State is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// The provider failed to deliver the state.
    #[error("State provider request failed: {message}")]
    ProviderFailed {
        /// HTTP status code, if the failure came from a response.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// Serialization error.
    #[error("State serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },
}

/// Result type alias for infrasync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::State(StateError::ProviderFailed { status: None, .. }) => true,
            Self::State(StateError::ProviderFailed {
                status: Some(code), ..
            }) => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::State(StateError::ProviderFailed {
                status: Some(429), ..
            }) => Some(5),
            _ if self.is_retryable() => Some(1),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl StateError {
    /// Creates a network-level provider error (no response received).
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::ProviderFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a provider error for an unsuccessful HTTP response.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::ProviderFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a corrupted-state error with the given message.
    #[must_use]
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SyncError::from(StateError::network("connection reset")).is_retryable());
        assert!(SyncError::from(StateError::http(503, "unavailable")).is_retryable());
        assert!(SyncError::from(StateError::http(429, "slow down")).is_retryable());
        assert!(!SyncError::from(StateError::http(404, "missing")).is_retryable());
        assert!(!SyncError::from(StateError::corrupted("bad json")).is_retryable());
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(
            SyncError::from(StateError::http(429, "slow down")).retry_delay_secs(),
            Some(5)
        );
        assert_eq!(
            SyncError::from(StateError::network("timeout")).retry_delay_secs(),
            Some(1)
        );
        assert_eq!(SyncError::internal("boom").retry_delay_secs(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = SyncError::from(ConfigError::DuplicateResource {
            key: String::from("server.web-1"),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Duplicate resource: server.web-1"
        );
    }
}
