//! Audit store error types.

/// Errors that can occur while reading or writing the audit store.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for audit store operations.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
