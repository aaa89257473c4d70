//! Error types for registry operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry did not answer within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// A 401 response carried no usable bearer challenge.
    #[error("Invalid authentication challenge: {message}")]
    AuthChallenge {
        /// Error message.
        message: String,
    },

    /// The token endpoint refused or returned an unusable response.
    #[error("Failed to fetch bearer token (status {status}): {message}")]
    TokenFetch {
        /// HTTP status code from the token endpoint.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The registry rejected the request even with a bearer token.
    #[error("Authentication failed with bearer token: status {status}")]
    AuthenticationFailed {
        /// HTTP status code of the retried request.
        status: u16,
    },

    /// The registry answered the initial request with neither 200 nor 401.
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code, 0 when no response was received.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// File I/O error.
    #[error("File I/O error at {path}: {source}")]
    IoError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("Invalid configuration file {path}: {source}")]
    InvalidConfigFile {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be configured.
    #[error("Invalid client configuration: {message}")]
    InvalidClientConfig {
        /// Error message.
        message: String,
    },
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::ConnectionFailed { url, source: err }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        } else {
            Self::HttpError {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unexpected_status() {
        let err = RegistryError::UnexpectedStatus {
            status: 404,
            url: "https://registry.example.com/v2/app/manifests/latest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status 404 from https://registry.example.com/v2/app/manifests/latest"
        );
    }

    #[test]
    fn test_error_display_token_fetch() {
        let err = RegistryError::TokenFetch {
            status: 403,
            message: "denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch bearer token (status 403): denied"
        );
    }

    #[test]
    fn test_error_display_auth_failed() {
        let err = RegistryError::AuthenticationFailed { status: 401 };
        assert_eq!(
            err.to_string(),
            "Authentication failed with bearer token: status 401"
        );
    }
}
