//! Audit store for the regstat registry notification service.
//!
//! This crate persists what the registry reports:
//! - Blobs, manifests and tags with their push and pull times
//! - Manifest to blob links discovered by re-fetching manifests
//! - An archive of deleted content, keyed like the live tables
//!
//! Every write is an idempotent upsert, so notifications can be redelivered
//! or applied concurrently. Two sqlx backends share the same DML:
//! [`PostgresStore`] for production and [`SqliteStore`] for single-node
//! setups and tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use regstat_audit::{BlobRepo, SqliteStore};
//! use regstat_core::Blob;
//!
//! # async fn example() -> Result<(), regstat_audit::AuditError> {
//! let store = SqliteStore::in_memory().await?;
//! store.push_blob(&Blob::observed("sha256:abc", Utc::now())).await?;
//! assert!(store.blob_exists("sha256:abc").await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repos;
pub mod schema;
mod sql;
pub mod sqlite;
pub mod store;

pub use config::{DatabaseConfig, DEFAULT_MAX_CONNECTIONS};
pub use error::{AuditError, AuditResult};
pub use postgres::PostgresStore;
pub use repos::{BlobRepo, ManifestRepo, TagRepo};
pub use schema::Backend;
pub use sqlite::SqliteStore;
pub use store::AuditStore;

use std::sync::Arc;

/// Create an audit store from configuration, applying the schema.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn connect(config: &DatabaseConfig) -> AuditResult<Arc<dyn AuditStore>> {
    match config {
        DatabaseConfig::Postgres {
            url,
            max_connections,
        } => {
            let store = PostgresStore::from_url(url, *max_connections).await?;
            Ok(Arc::new(store) as Arc<dyn AuditStore>)
        }
        DatabaseConfig::Sqlite { url } => {
            let store = SqliteStore::from_url(url).await?;
            Ok(Arc::new(store) as Arc<dyn AuditStore>)
        }
    }
}
