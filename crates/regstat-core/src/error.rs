//! Error types for regstat core operations.
//!
//! This module defines the error types used throughout the `regstat-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in regstat core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The notification envelope could not be decoded.
    #[error("Malformed notification envelope: {source}")]
    MalformedEnvelope {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
