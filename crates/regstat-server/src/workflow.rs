//! Event reconciliation.
//!
//! The [`Workflow`] turns one notification event into audit store writes.
//! Manifest pushes are enriched with the blobs the manifest references by
//! re-fetching the manifest document from the registry. A failed fetch is
//! logged and the manifest is recorded without blob links.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regstat_audit::AuditStore;
use regstat_core::{Blob, Event, Manifest, Tag, TargetKind};
use regstat_registry::{EquivalentRegistries, ManifestFetcher};
use tracing::{debug, info, instrument, warn};

use crate::error::WorkflowError;

/// What processing an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A blob push was recorded.
    BlobPushed,
    /// A blob pull was recorded.
    BlobPulled,
    /// A manifest push and its tag were recorded.
    ManifestPushed {
        /// Number of blobs linked to the manifest.
        blobs: usize,
    },
    /// A manifest pull and its tag were recorded.
    ManifestPulled,
    /// A live blob was archived.
    BlobDeleted,
    /// A live manifest and its tags were archived.
    ManifestDeleted,
    /// Delete of a digest that is neither a live manifest nor a live blob.
    UnknownDigest,
    /// Pull of a manifest by digest, which carries no tag to record.
    UntaggedPull,
    /// The target media type is neither a blob nor a manifest.
    UnsupportedMediaType(String),
}

impl Outcome {
    /// Returns true if the event changed the audit store.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(
            self,
            Self::BlobPushed
                | Self::BlobPulled
                | Self::ManifestPushed { .. }
                | Self::ManifestPulled
                | Self::BlobDeleted
                | Self::ManifestDeleted
        )
    }

    /// Returns the skip reason for events that were dropped.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::UnknownDigest => Some("unknown_digest"),
            Self::UntaggedPull => Some("untagged_pull"),
            Self::UnsupportedMediaType(_) => Some("unsupported_media_type"),
            _ => None,
        }
    }
}

/// Handler for the three audited actions.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Records a push.
    async fn process_push(&self, event: &Event) -> Result<Outcome, WorkflowError>;

    /// Records a pull.
    async fn process_pull(&self, event: &Event) -> Result<Outcome, WorkflowError>;

    /// Archives the deleted digest.
    async fn process_delete(&self, event: &Event) -> Result<Outcome, WorkflowError>;
}

/// Reconciles notification events into the audit store.
#[derive(Clone)]
pub struct Workflow {
    store: Arc<dyn AuditStore>,
    fetcher: Arc<dyn ManifestFetcher>,
    equivalents: Arc<EquivalentRegistries>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("backend", &self.store.backend())
            .field("equivalents", &self.equivalents)
            .finish_non_exhaustive()
    }
}

impl Workflow {
    /// Creates a workflow over a store, a manifest source and an
    /// equivalence table.
    pub fn new(
        store: Arc<dyn AuditStore>,
        fetcher: Arc<dyn ManifestFetcher>,
        equivalents: EquivalentRegistries,
    ) -> Self {
        Self {
            store,
            fetcher,
            equivalents: Arc::new(equivalents),
        }
    }

    /// Returns the audit store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Builds the tag an event refers to, named under the canonical registry.
    fn tag_for(&self, event: &Event) -> Tag {
        let host = event.request.host.as_str();
        let target = &event.target;
        Tag {
            name: Tag::compose_name(
                self.equivalents.resolve(host),
                &target.repository,
                &target.tag,
            ),
            registry: host.to_string(),
            repository: target.repository.clone(),
            tag: target.tag.clone(),
            manifest_digest: target.digest.clone(),
            pushed: event.timestamp,
            pulled: event.timestamp,
        }
    }

    /// Appends the config and layer blobs of the manifest document at `url`.
    async fn enrich(&self, manifest: &mut Manifest, url: &str, timestamp: DateTime<Utc>) {
        match self.fetcher.fetch_manifest(url).await {
            Ok(document) => {
                for digest in document.blob_digests() {
                    manifest.add_blob(digest, timestamp);
                }
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to fetch manifest, recording it without blobs");
            }
        }
    }

    fn unsupported(media_type: String) -> Outcome {
        info!(
            media_type = %media_type,
            reason = "unsupported_media_type",
            "Ignoring event for unknown media type"
        );
        Outcome::UnsupportedMediaType(media_type)
    }
}

#[async_trait]
impl EventHandler for Workflow {
    #[instrument(skip_all, fields(digest = %event.target.digest, media_type = %event.target.media_type))]
    async fn process_push(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        let digest = event.target.digest.as_str();
        match event.kind() {
            TargetKind::Blob => {
                let blob = Blob::observed(digest, event.timestamp);
                self.store
                    .push_blob(&blob)
                    .await
                    .map_err(WorkflowError::persistence("push blob", digest))?;
                info!("Recorded blob push");
                Ok(Outcome::BlobPushed)
            }
            TargetKind::Manifest => {
                let mut manifest = Manifest::observed(digest, event.timestamp);
                self.enrich(&mut manifest, &event.target.url, event.timestamp)
                    .await;
                let tag = self.tag_for(event);

                self.store
                    .push_manifest(&manifest)
                    .await
                    .map_err(WorkflowError::persistence("push manifest", digest))?;
                self.store
                    .push_tag(&tag)
                    .await
                    .map_err(WorkflowError::persistence("push tag", digest))?;

                let blobs = manifest.blobs.len();
                info!(tag = %tag.name, blobs, "Recorded manifest push");
                Ok(Outcome::ManifestPushed { blobs })
            }
            TargetKind::Other(media_type) => Ok(Self::unsupported(media_type)),
        }
    }

    #[instrument(skip_all, fields(digest = %event.target.digest, media_type = %event.target.media_type))]
    async fn process_pull(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        let digest = event.target.digest.as_str();
        match event.kind() {
            TargetKind::Blob => {
                let blob = Blob::observed(digest, event.timestamp);
                self.store
                    .pull_blob(&blob)
                    .await
                    .map_err(WorkflowError::persistence("pull blob", digest))?;
                debug!("Recorded blob pull");
                Ok(Outcome::BlobPulled)
            }
            TargetKind::Manifest => {
                let tag = self.tag_for(event);
                if tag.is_untagged() {
                    debug!(reason = "untagged_pull", "Ignoring pull of manifest by digest");
                    return Ok(Outcome::UntaggedPull);
                }
                let manifest = Manifest::observed(digest, event.timestamp);

                self.store
                    .pull_manifest(&manifest)
                    .await
                    .map_err(WorkflowError::persistence("pull manifest", digest))?;
                self.store
                    .pull_tag(&tag)
                    .await
                    .map_err(WorkflowError::persistence("pull tag", digest))?;

                info!(tag = %tag.name, "Recorded manifest pull");
                Ok(Outcome::ManifestPulled)
            }
            TargetKind::Other(media_type) => Ok(Self::unsupported(media_type)),
        }
    }

    #[instrument(skip_all, fields(digest = %event.target.digest))]
    async fn process_delete(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        let digest = event.target.digest.as_str();

        let is_manifest = self
            .store
            .manifest_exists(digest)
            .await
            .map_err(WorkflowError::persistence("look up manifest", digest))?;
        if is_manifest {
            let removed = self
                .store
                .delete_manifest(digest, event.timestamp)
                .await
                .map_err(WorkflowError::persistence("delete manifest", digest))?;
            if removed {
                info!("Archived deleted manifest");
                return Ok(Outcome::ManifestDeleted);
            }
            debug!(reason = "unknown_digest", "Manifest already removed");
            return Ok(Outcome::UnknownDigest);
        }

        let is_blob = self
            .store
            .blob_exists(digest)
            .await
            .map_err(WorkflowError::persistence("look up blob", digest))?;
        if is_blob {
            let removed = self
                .store
                .delete_blob(digest, event.timestamp)
                .await
                .map_err(WorkflowError::persistence("delete blob", digest))?;
            if removed {
                info!("Archived deleted blob");
                return Ok(Outcome::BlobDeleted);
            }
            debug!(reason = "unknown_digest", "Blob already removed");
            return Ok(Outcome::UnknownDigest);
        }

        info!(reason = "unknown_digest", "Ignoring delete of unknown digest");
        Ok(Outcome::UnknownDigest)
    }
}
