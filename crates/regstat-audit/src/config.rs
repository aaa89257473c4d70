//! Database selection.

use crate::error::{AuditError, AuditResult};
use crate::schema::Backend;

/// Default PostgreSQL pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Where the audit trail is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// A PostgreSQL server.
    Postgres {
        /// Connection URL (`postgres://...` or `postgresql://...`).
        url: String,
        /// Maximum pool size.
        max_connections: u32,
    },
    /// A SQLite file or in-memory database.
    Sqlite {
        /// Connection URL (`sqlite:path` or `sqlite::memory:`).
        url: String,
    },
}

impl DatabaseConfig {
    /// Selects a backend from a connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] for an empty URL or an unsupported scheme.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_audit::{Backend, DatabaseConfig};
    ///
    /// let config = DatabaseConfig::from_url("postgres://localhost/regstat", 10)?;
    /// assert_eq!(config.backend(), Backend::Postgres);
    ///
    /// let config = DatabaseConfig::from_url("sqlite::memory:", 10)?;
    /// assert_eq!(config.backend(), Backend::Sqlite);
    /// # Ok::<(), regstat_audit::AuditError>(())
    /// ```
    pub fn from_url(url: &str, max_connections: u32) -> AuditResult<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AuditError::Config("database url is empty".to_string()));
        }

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres {
                url: url.to_string(),
                max_connections,
            })
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite {
                url: url.to_string(),
            })
        } else {
            let scheme = url.split(':').next().unwrap_or(url);
            Err(AuditError::Config(format!(
                "unsupported database url scheme: {scheme}"
            )))
        }
    }

    /// The backend this configuration selects.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::Postgres { .. } => Backend::Postgres,
            Self::Sqlite { .. } => Backend::Sqlite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_postgres() {
        let config = DatabaseConfig::from_url("postgresql://u:p@db:5432/regstat", 5).unwrap();
        assert_eq!(
            config,
            DatabaseConfig::Postgres {
                url: "postgresql://u:p@db:5432/regstat".to_string(),
                max_connections: 5,
            }
        );
    }

    #[test]
    fn test_from_url_sqlite() {
        let config = DatabaseConfig::from_url("sqlite:/var/lib/regstat/audit.db", 5).unwrap();
        assert_eq!(config.backend(), Backend::Sqlite);
    }

    #[test]
    fn test_from_url_empty() {
        assert!(matches!(
            DatabaseConfig::from_url("  ", 5),
            Err(AuditError::Config(_))
        ));
    }

    #[test]
    fn test_from_url_unsupported() {
        let err = DatabaseConfig::from_url("mysql://localhost/regstat", 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: unsupported database url scheme: mysql"
        );
    }
}
