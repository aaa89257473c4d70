//! Audit store trait and the implementation shared by every sqlx backend.

use crate::error::AuditResult;
use crate::repos::{BlobRepo, ManifestRepo, TagRepo};
use crate::schema::Backend;
use async_trait::async_trait;

/// Combined audit store trait.
///
/// Every mutation is an idempotent upsert keyed on digest or tag name, so
/// redelivered or concurrent notifications converge on one row.
#[async_trait]
pub trait AuditStore: BlobRepo + ManifestRepo + TagRepo + Send + Sync {
    /// Create the schema if it does not exist.
    async fn migrate(&self) -> AuditResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> AuditResult<()>;

    /// The backend this store writes to.
    fn backend(&self) -> Backend;
}

/// Implements the repository traits and the lookup helpers for a store type
/// holding a sqlx `pool` field.
macro_rules! impl_audit_store {
    ($store:ty) => {
        #[async_trait::async_trait]
        impl $crate::repos::BlobRepo for $store {
            async fn blob_exists(&self, digest: &str) -> $crate::error::AuditResult<bool> {
                let exists: bool = sqlx::query_scalar($crate::sql::BLOB_EXISTS)
                    .bind(digest)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(exists)
            }

            async fn push_blob(&self, blob: &regstat_core::Blob) -> $crate::error::AuditResult<()> {
                sqlx::query($crate::sql::PUSH_BLOB)
                    .bind(&blob.digest)
                    .bind(blob.pushed)
                    .execute(&self.pool)
                    .await?;
                tracing::debug!(digest = %blob.digest, "Pushed blob");
                Ok(())
            }

            async fn pull_blob(&self, blob: &regstat_core::Blob) -> $crate::error::AuditResult<()> {
                sqlx::query($crate::sql::PULL_BLOB)
                    .bind(&blob.digest)
                    .bind(blob.pushed)
                    .bind(blob.pulled)
                    .execute(&self.pool)
                    .await?;
                tracing::debug!(digest = %blob.digest, "Pulled blob");
                Ok(())
            }

            async fn delete_blob(
                &self,
                digest: &str,
                deleted: chrono::DateTime<chrono::Utc>,
            ) -> $crate::error::AuditResult<bool> {
                let mut tx = self.pool.begin().await?;

                sqlx::query($crate::sql::ARCHIVE_BLOB)
                    .bind(digest)
                    .bind(deleted)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query($crate::sql::ARCHIVE_BLOB_LINKS)
                    .bind(digest)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query($crate::sql::DELETE_BLOB_LINKS)
                    .bind(digest)
                    .execute(&mut *tx)
                    .await?;
                let removed = sqlx::query($crate::sql::DELETE_BLOB)
                    .bind(digest)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                tx.commit().await?;
                tracing::debug!(digest, removed, "Deleted blob");
                Ok(removed > 0)
            }
        }

        #[async_trait::async_trait]
        impl $crate::repos::ManifestRepo for $store {
            async fn manifest_exists(&self, digest: &str) -> $crate::error::AuditResult<bool> {
                let exists: bool = sqlx::query_scalar($crate::sql::MANIFEST_EXISTS)
                    .bind(digest)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(exists)
            }

            async fn push_manifest(
                &self,
                manifest: &regstat_core::Manifest,
            ) -> $crate::error::AuditResult<()> {
                let mut tx = self.pool.begin().await?;

                sqlx::query($crate::sql::PUSH_MANIFEST)
                    .bind(&manifest.digest)
                    .bind(manifest.pushed)
                    .execute(&mut *tx)
                    .await?;
                for blob in &manifest.blobs {
                    sqlx::query($crate::sql::PULL_BLOB)
                        .bind(&blob.digest)
                        .bind(blob.pushed)
                        .bind(blob.pulled)
                        .execute(&mut *tx)
                        .await?;
                    sqlx::query($crate::sql::LINK_BLOB)
                        .bind(&manifest.digest)
                        .bind(&blob.digest)
                        .execute(&mut *tx)
                        .await?;
                }

                tx.commit().await?;
                tracing::debug!(
                    digest = %manifest.digest,
                    blobs = manifest.blobs.len(),
                    "Pushed manifest"
                );
                Ok(())
            }

            async fn pull_manifest(
                &self,
                manifest: &regstat_core::Manifest,
            ) -> $crate::error::AuditResult<()> {
                let mut tx = self.pool.begin().await?;

                sqlx::query($crate::sql::PULL_MANIFEST)
                    .bind(&manifest.digest)
                    .bind(manifest.pushed)
                    .bind(manifest.pulled)
                    .execute(&mut *tx)
                    .await?;
                let cascaded = sqlx::query($crate::sql::PULL_LINKED_BLOBS)
                    .bind(manifest.pulled)
                    .bind(&manifest.digest)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                tx.commit().await?;
                tracing::debug!(digest = %manifest.digest, cascaded, "Pulled manifest");
                Ok(())
            }

            async fn delete_manifest(
                &self,
                digest: &str,
                deleted: chrono::DateTime<chrono::Utc>,
            ) -> $crate::error::AuditResult<bool> {
                let mut tx = self.pool.begin().await?;

                for archive in [
                    $crate::sql::ARCHIVE_MANIFEST,
                    $crate::sql::ARCHIVE_MANIFEST_TAGS,
                ] {
                    sqlx::query(archive)
                        .bind(digest)
                        .bind(deleted)
                        .execute(&mut *tx)
                        .await?;
                }
                for statement in [
                    $crate::sql::ARCHIVE_MANIFEST_LINKS,
                    $crate::sql::DELETE_MANIFEST_TAGS,
                    $crate::sql::DELETE_MANIFEST_LINKS,
                ] {
                    sqlx::query(statement)
                        .bind(digest)
                        .execute(&mut *tx)
                        .await?;
                }
                let removed = sqlx::query($crate::sql::DELETE_MANIFEST)
                    .bind(digest)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                tx.commit().await?;
                tracing::debug!(digest, removed, "Deleted manifest");
                Ok(removed > 0)
            }
        }

        #[async_trait::async_trait]
        impl $crate::repos::TagRepo for $store {
            async fn push_tag(&self, tag: &regstat_core::Tag) -> $crate::error::AuditResult<()> {
                sqlx::query($crate::sql::PUSH_TAG)
                    .bind(&tag.name)
                    .bind(&tag.registry)
                    .bind(&tag.repository)
                    .bind((!tag.tag.is_empty()).then_some(tag.tag.as_str()))
                    .bind(&tag.manifest_digest)
                    .bind(tag.pushed)
                    .execute(&self.pool)
                    .await?;
                tracing::debug!(name = %tag.name, manifest = %tag.manifest_digest, "Pushed tag");
                Ok(())
            }

            async fn pull_tag(&self, tag: &regstat_core::Tag) -> $crate::error::AuditResult<()> {
                sqlx::query($crate::sql::PULL_TAG)
                    .bind(&tag.name)
                    .bind(&tag.registry)
                    .bind(&tag.repository)
                    .bind((!tag.tag.is_empty()).then_some(tag.tag.as_str()))
                    .bind(&tag.manifest_digest)
                    .bind(tag.pushed)
                    .bind(tag.pulled)
                    .execute(&self.pool)
                    .await?;
                tracing::debug!(name = %tag.name, "Pulled tag");
                Ok(())
            }
        }

        impl $store {
            /// Get a live blob by digest.
            pub async fn blob(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::BlobRow>> {
                let row = sqlx::query_as::<_, $crate::models::BlobRow>($crate::sql::SELECT_BLOB)
                    .bind(digest)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row)
            }

            /// Get a live manifest by digest.
            pub async fn manifest(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::ManifestRow>> {
                let row =
                    sqlx::query_as::<_, $crate::models::ManifestRow>($crate::sql::SELECT_MANIFEST)
                        .bind(digest)
                        .fetch_optional(&self.pool)
                        .await?;
                Ok(row)
            }

            /// Get a live tag by name.
            pub async fn tag(
                &self,
                name: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::TagRow>> {
                let row = sqlx::query_as::<_, $crate::models::TagRow>($crate::sql::SELECT_TAG)
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row)
            }

            /// Get an archived blob by digest.
            pub async fn deleted_blob(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::DeletedBlobRow>> {
                let row = sqlx::query_as::<_, $crate::models::DeletedBlobRow>(
                    $crate::sql::SELECT_DELETED_BLOB,
                )
                .bind(digest)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            /// Get an archived manifest by digest.
            pub async fn deleted_manifest(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::DeletedManifestRow>> {
                let row = sqlx::query_as::<_, $crate::models::DeletedManifestRow>(
                    $crate::sql::SELECT_DELETED_MANIFEST,
                )
                .bind(digest)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            /// Get an archived tag by name.
            pub async fn deleted_tag(
                &self,
                name: &str,
            ) -> $crate::error::AuditResult<Option<$crate::models::DeletedTagRow>> {
                let row = sqlx::query_as::<_, $crate::models::DeletedTagRow>(
                    $crate::sql::SELECT_DELETED_TAG,
                )
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            /// List live links whose manifest or blob digest is `digest`.
            pub async fn links(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Vec<$crate::models::ManifestBlobRow>> {
                let rows =
                    sqlx::query_as::<_, $crate::models::ManifestBlobRow>($crate::sql::SELECT_LINKS)
                        .bind(digest)
                        .fetch_all(&self.pool)
                        .await?;
                Ok(rows)
            }

            /// List archived links whose manifest or blob digest is `digest`.
            pub async fn deleted_links(
                &self,
                digest: &str,
            ) -> $crate::error::AuditResult<Vec<$crate::models::ManifestBlobRow>> {
                let rows = sqlx::query_as::<_, $crate::models::ManifestBlobRow>(
                    $crate::sql::SELECT_DELETED_LINKS,
                )
                .bind(digest)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            /// Count live blobs.
            pub async fn blob_count(&self) -> $crate::error::AuditResult<i64> {
                let count: i64 = sqlx::query_scalar($crate::sql::COUNT_BLOBS)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(count)
            }
        }
    };
}

pub(crate) use impl_audit_store;
