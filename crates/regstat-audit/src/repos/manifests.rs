//! Manifest repository.

use crate::error::AuditResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regstat_core::Manifest;

/// Repository for manifest operations.
#[async_trait]
pub trait ManifestRepo: Send + Sync {
    /// Check if a live manifest exists.
    async fn manifest_exists(&self, digest: &str) -> AuditResult<bool>;

    /// Insert a manifest, or refresh the `pushed` time of an existing one.
    ///
    /// In the same transaction, each referenced blob is upserted as a pull
    /// and linked to the manifest. Existing links are kept.
    async fn push_manifest(&self, manifest: &Manifest) -> AuditResult<()>;

    /// Insert a manifest, or refresh the `pulled` time of an existing one.
    ///
    /// The pulled time is cascaded to every blob linked to the manifest.
    async fn pull_manifest(&self, manifest: &Manifest) -> AuditResult<()>;

    /// Move a manifest and the tags pointing at it to the archive, in one
    /// transaction:
    ///
    /// 1. copy the manifest row into `deleted_manifests` (merge on conflict)
    /// 2. copy tag rows pointing at it into `deleted_tags` (merge by name)
    /// 3. copy its link rows into `deleted_manifest_blob` (kept on conflict)
    /// 4. delete live tags, then links, then the manifest
    ///
    /// Linked blobs stay live. Returns `Ok(true)` if a live manifest was
    /// removed, `Ok(false)` if none existed.
    async fn delete_manifest(&self, digest: &str, deleted: DateTime<Utc>) -> AuditResult<bool>;
}
