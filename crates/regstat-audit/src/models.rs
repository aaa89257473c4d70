//! Database rows mapping to the audit schema.
//!
//! Column names match field names.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Live blob record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BlobRow {
    pub digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
}

/// Live manifest record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ManifestRow {
    pub digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
}

/// Live tag record. `tag` is `None` for digest references.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TagRow {
    pub name: String,
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub manifest_digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
}

/// Archived blob record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DeletedBlobRow {
    pub digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
    pub deleted: DateTime<Utc>,
}

/// Archived manifest record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DeletedManifestRow {
    pub digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
    pub deleted: DateTime<Utc>,
}

/// Archived tag record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DeletedTagRow {
    pub name: String,
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub manifest_digest: String,
    pub pushed: DateTime<Utc>,
    pub pulled: Option<DateTime<Utc>>,
    pub deleted: DateTime<Utc>,
}

/// Manifest to blob link, live or archived.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ManifestBlobRow {
    pub manifest_digest: String,
    pub blob_digest: String,
}
