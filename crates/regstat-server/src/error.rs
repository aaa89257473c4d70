//! Error types for the server crate.
//!
//! [`WorkflowError`] covers the processing of a single event and never stops
//! the rest of a payload. [`ServerError`] covers the listener and payload
//! decoding.

use std::net::SocketAddr;

use regstat_audit::AuditError;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors raised while processing one notification event.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A store operation failed.
    #[error("failed to {operation} '{digest}': {source}")]
    Persistence {
        /// The store operation that failed.
        operation: &'static str,
        /// Digest of the event target.
        digest: String,
        /// Underlying store error.
        #[source]
        source: AuditError,
    },
}

impl WorkflowError {
    pub(crate) fn persistence(
        operation: &'static str,
        digest: impl Into<String>,
    ) -> impl FnOnce(AuditError) -> Self {
        let digest = digest.into();
        move |source| Self::Persistence {
            operation,
            digest,
            source,
        }
    }

    /// Returns the store operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Persistence { operation, .. } => operation,
        }
    }
}

/// Errors raised by the listener and the payload dispatcher.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The payload was not a notification envelope.
    #[error("invalid notification payload: {0}")]
    Payload(#[from] regstat_core::Error),

    /// The listener could not bind its address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The listener failed while serving.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason for invalidity.
        reason: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
