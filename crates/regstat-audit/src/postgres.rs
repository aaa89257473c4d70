//! PostgreSQL-based audit store implementation.

use crate::error::AuditResult;
use crate::schema::{statements, Backend, POSTGRES_SCHEMA};
use crate::store::{impl_audit_store, AuditStore};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::str::FromStr;

/// Schema the audit tables live in.
pub const POSTGRES_SCHEMA_NAME: &str = "regstat";

/// PostgreSQL-based audit store.
///
/// Connections set `search_path` to the `regstat` schema, so the shared DML
/// uses unqualified table names.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database is unreachable or
    /// the schema cannot be created.
    pub async fn from_url(url: &str, max_connections: u32) -> AuditResult<Self> {
        let opts = PgConnectOptions::from_str(url)?
            .options([("search_path", POSTGRES_SCHEMA_NAME)]);

        tracing::info!(
            host = opts.get_host(),
            port = opts.get_port(),
            database = opts.get_database().unwrap_or("<default>"),
            max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl AuditStore for PostgresStore {
    async fn migrate(&self) -> AuditResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared statement.
        for statement in statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> AuditResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> Backend {
        Backend::Postgres
    }
}

impl_audit_store!(PostgresStore);
