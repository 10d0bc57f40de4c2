//! Error types and result aliases for shroud.
//!
//! This module defines the shared error types used across all shroud
//! components. Errors are structured for programmatic handling; the engine
//! never recovers internally. A run either returns a complete output or one
//! of these errors.

/// The result type used throughout shroud.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shroud operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The suppression configuration failed validation.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what made the configuration invalid.
        message: String,
    },

    /// An input record could not be ingested.
    #[error("malformed input: {message}")]
    MalformedInput {
        /// Description of the offending record or value.
        message: String,
    },

    /// An internal invariant was violated. This indicates a bug in the
    /// engine, not a problem with the caller's input.
    #[error("internal invariant violation: {message}")]
    InternalInvariant {
        /// Description of the violated invariant.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid-config error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a new malformed-input error with the given message.
    #[must_use]
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates a new internal-invariant error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::invalid_config("threshold must be >= 1");
        assert_eq!(err.to_string(), "invalid config: threshold must be >= 1");

        let err = Error::malformed_input("negative incidence");
        assert_eq!(err.to_string(), "malformed input: negative incidence");

        let err = Error::internal("pass bound exceeded");
        assert_eq!(
            err.to_string(),
            "internal invariant violation: pass bound exceeded"
        );
    }
}
