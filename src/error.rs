//! Error types and handling for the deer guide

use std::fmt;

use thiserror::Error;

/// Fixed guidance text published when an analysis run fails.
pub const FALLBACK_MESSAGE: &str =
    "Could not analyze this location. Try a nearby landmark or town name.";

/// External service an upstream error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Geocoding,
    Weather,
    Elevation,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upstream::Geocoding => "geocoding",
            Upstream::Weather => "weather",
            Upstream::Elevation => "elevation",
        };
        f.write_str(name)
    }
}

/// Main error type for the deer guide
#[derive(Error, Debug)]
pub enum DeerGuideError {
    /// Geocoding returned no usable result
    #[error("No location found for '{query}'")]
    NoMatch { query: String },

    /// Transport-level failure talking to an upstream service
    #[error("{upstream} request failed: {cause}")]
    Upstream { upstream: Upstream, cause: String },

    /// Upstream body could not be decoded
    #[error("Malformed {upstream} response: {cause}")]
    MalformedResponse { upstream: Upstream, cause: String },

    /// Another analysis run is still in flight
    #[error("An analysis run is already in progress")]
    Busy,

    /// Unexpected failure inside an analysis run
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl DeerGuideError {
    pub fn no_match<S: Into<String>>(query: S) -> Self {
        Self::NoMatch {
            query: query.into(),
        }
    }

    pub fn upstream<S: Into<String>>(upstream: Upstream, cause: S) -> Self {
        Self::Upstream {
            upstream,
            cause: cause.into(),
        }
    }

    pub fn malformed<S: Into<String>>(upstream: Upstream, cause: S) -> Self {
        Self::MalformedResponse {
            upstream,
            cause: cause.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DeerGuideError::NoMatch { .. }
            | DeerGuideError::Upstream { .. }
            | DeerGuideError::MalformedResponse { .. }
            | DeerGuideError::Internal { .. } => FALLBACK_MESSAGE.to_string(),
            DeerGuideError::Busy => {
                "An analysis is already running. Please wait for it to finish.".to_string()
            }
            DeerGuideError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            DeerGuideError::Validation { message } => format!("Invalid input: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DeerGuideError::no_match("Nowhere");
        assert!(matches!(err, DeerGuideError::NoMatch { .. }));

        let err = DeerGuideError::upstream(Upstream::Weather, "connection reset");
        assert!(matches!(
            err,
            DeerGuideError::Upstream {
                upstream: Upstream::Weather,
                ..
            }
        ));

        let err = DeerGuideError::malformed(Upstream::Elevation, "expected value");
        assert!(matches!(err, DeerGuideError::MalformedResponse { .. }));
    }

    #[test]
    fn test_display_names_upstream() {
        let err = DeerGuideError::upstream(Upstream::Elevation, "HTTP 503");
        assert_eq!(err.to_string(), "elevation request failed: HTTP 503");
    }

    #[test]
    fn test_run_failures_share_fallback_message() {
        assert_eq!(
            DeerGuideError::no_match("x").user_message(),
            FALLBACK_MESSAGE
        );
        assert_eq!(
            DeerGuideError::upstream(Upstream::Geocoding, "timeout").user_message(),
            FALLBACK_MESSAGE
        );
        assert_eq!(
            DeerGuideError::malformed(Upstream::Weather, "eof").user_message(),
            FALLBACK_MESSAGE
        );
    }

    #[test]
    fn test_user_messages() {
        let validation_err = DeerGuideError::validation("Location cannot be empty");
        assert!(validation_err.user_message().contains("Location cannot be empty"));

        let config_err = DeerGuideError::config("bad url");
        assert!(config_err.user_message().contains("Configuration error"));

        assert!(DeerGuideError::Busy.user_message().contains("already running"));
    }
}
