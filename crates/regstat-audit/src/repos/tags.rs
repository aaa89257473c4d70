//! Tag repository.

use crate::error::AuditResult;
use async_trait::async_trait;
use regstat_core::Tag;

/// Repository for tag operations.
///
/// A tag references a live manifest, so the manifest must be written first.
#[async_trait]
pub trait TagRepo: Send + Sync {
    /// Insert a tag, or retarget an existing one and refresh its `pushed` time.
    async fn push_tag(&self, tag: &Tag) -> AuditResult<()>;

    /// Insert a tag, or refresh the `pulled` time of an existing one.
    async fn pull_tag(&self, tag: &Tag) -> AuditResult<()>;
}
