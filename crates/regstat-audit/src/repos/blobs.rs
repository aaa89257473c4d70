//! Blob repository.

use crate::error::AuditResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regstat_core::Blob;

/// Repository for blob operations.
#[async_trait]
pub trait BlobRepo: Send + Sync {
    /// Check if a live blob exists.
    async fn blob_exists(&self, digest: &str) -> AuditResult<bool>;

    /// Insert a blob, or refresh the `pushed` time of an existing one.
    ///
    /// A newly inserted blob has no `pulled` time.
    async fn push_blob(&self, blob: &Blob) -> AuditResult<()>;

    /// Insert a blob, or refresh the `pulled` time of an existing one.
    ///
    /// A blob first seen through a pull is inserted with both times set.
    async fn pull_blob(&self, blob: &Blob) -> AuditResult<()>;

    /// Move a blob to the archive, in one transaction:
    ///
    /// 1. copy the blob row into `deleted_blobs` (all fields refreshed on conflict)
    /// 2. copy its link rows into `deleted_manifest_blob` (kept on conflict)
    /// 3. delete its live link rows
    /// 4. delete the live blob row
    ///
    /// Returns `Ok(true)` if a live blob was removed, `Ok(false)` if none existed.
    async fn delete_blob(&self, digest: &str, deleted: DateTime<Utc>) -> AuditResult<bool>;
}
