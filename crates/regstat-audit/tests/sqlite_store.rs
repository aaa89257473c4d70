//! Store behaviour against an in-memory SQLite database.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use regstat_audit::{
    connect, AuditStore, Backend, BlobRepo, DatabaseConfig, ManifestRepo, SqliteStore, TagRepo,
};
use regstat_core::{Blob, Manifest, Tag};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.expect("open store")
}

fn blob_pushed(digest: &str, at: DateTime<Utc>) -> Blob {
    Blob::observed(digest, at)
}

fn manifest_with_blobs(digest: &str, at: DateTime<Utc>, blobs: &[&str]) -> Manifest {
    let mut manifest = Manifest::observed(digest, at);
    for blob in blobs {
        manifest.add_blob(*blob, at);
    }
    manifest
}

fn tag(name_tag: &str, manifest: &str, at: DateTime<Utc>) -> Tag {
    Tag {
        name: Tag::compose_name("reg.io", "team/app", name_tag),
        registry: "reg.io".to_string(),
        repository: "team/app".to_string(),
        tag: name_tag.to_string(),
        manifest_digest: manifest.to_string(),
        pushed: at,
        pulled: at,
    }
}

#[tokio::test]
async fn test_push_blob_is_idempotent() {
    let store = store().await;

    store.push_blob(&blob_pushed("sha256:b1", ts(1))).await.unwrap();
    store.push_blob(&blob_pushed("sha256:b1", ts(2))).await.unwrap();

    assert_eq!(store.blob_count().await.unwrap(), 1);
    let row = store.blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(2));
    assert_eq!(row.pulled, None);
}

#[tokio::test]
async fn test_pull_before_push_creates_row() {
    let store = store().await;

    store.pull_blob(&Blob::observed("sha256:b1", ts(5))).await.unwrap();
    let row = store.blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(5));
    assert_eq!(row.pulled, Some(ts(5)));

    store.pull_blob(&Blob::observed("sha256:b1", ts(9))).await.unwrap();
    let row = store.blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(5));
    assert_eq!(row.pulled, Some(ts(9)));
}

#[tokio::test]
async fn test_exists_probes() {
    let store = store().await;
    assert!(!store.blob_exists("sha256:b1").await.unwrap());
    assert!(!store.manifest_exists("sha256:m1").await.unwrap());

    store.push_blob(&blob_pushed("sha256:b1", ts(1))).await.unwrap();
    store
        .push_manifest(&Manifest::observed("sha256:m1", ts(1)))
        .await
        .unwrap();

    assert!(store.blob_exists("sha256:b1").await.unwrap());
    assert!(!store.blob_exists("sha256:m1").await.unwrap());
    assert!(store.manifest_exists("sha256:m1").await.unwrap());
    assert!(!store.manifest_exists("sha256:b1").await.unwrap());
}

#[tokio::test]
async fn test_delete_blob_moves_row_to_archive() {
    let store = store().await;
    store.push_blob(&blob_pushed("sha256:b1", ts(1))).await.unwrap();
    store.pull_blob(&Blob::observed("sha256:b1", ts(2))).await.unwrap();

    assert!(store.delete_blob("sha256:b1", ts(3)).await.unwrap());

    assert!(store.blob("sha256:b1").await.unwrap().is_none());
    let archived = store.deleted_blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(archived.digest, "sha256:b1");
    assert_eq!(archived.pushed, ts(1));
    assert_eq!(archived.pulled, Some(ts(2)));
    assert_eq!(archived.deleted, ts(3));
}

#[tokio::test]
async fn test_delete_missing_rows_is_noop() {
    let store = store().await;
    assert!(!store.delete_blob("sha256:none", ts(1)).await.unwrap());
    assert!(!store.delete_manifest("sha256:none", ts(1)).await.unwrap());
    assert!(store.deleted_blob("sha256:none").await.unwrap().is_none());
    assert!(store.deleted_manifest("sha256:none").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_blob_archives_and_removes_links() {
    let store = store().await;
    store
        .push_manifest(&manifest_with_blobs("sha256:m1", ts(1), &["sha256:c", "sha256:l1"]))
        .await
        .unwrap();

    assert!(store.delete_blob("sha256:l1", ts(4)).await.unwrap());

    let live = store.links("sha256:m1").await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].blob_digest, "sha256:c");

    let archived = store.deleted_links("sha256:l1").await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].manifest_digest, "sha256:m1");
    assert!(store.manifest_exists("sha256:m1").await.unwrap());
}

#[tokio::test]
async fn test_redelete_refreshes_archive() {
    let store = store().await;

    store.push_blob(&blob_pushed("sha256:b1", ts(1))).await.unwrap();
    store.delete_blob("sha256:b1", ts(2)).await.unwrap();

    store.push_blob(&blob_pushed("sha256:b1", ts(10))).await.unwrap();
    store.delete_blob("sha256:b1", ts(11)).await.unwrap();

    let archived = store.deleted_blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(archived.pushed, ts(10));
    assert_eq!(archived.deleted, ts(11));
}

#[tokio::test]
async fn test_push_manifest_links_blobs_as_pulled() {
    let store = store().await;
    let manifest = manifest_with_blobs("sha256:m1", ts(1), &["sha256:c", "sha256:l1", "sha256:l2"]);

    store.push_manifest(&manifest).await.unwrap();
    store.push_manifest(&manifest).await.unwrap();

    let row = store.manifest("sha256:m1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(1));
    assert_eq!(row.pulled, None);

    for digest in ["sha256:c", "sha256:l1", "sha256:l2"] {
        let blob = store.blob(digest).await.unwrap().unwrap();
        assert_eq!(blob.pushed, ts(1));
        assert_eq!(blob.pulled, Some(ts(1)));
    }
    assert_eq!(store.links("sha256:m1").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_push_manifest_without_blobs() {
    let store = store().await;
    store
        .push_manifest(&Manifest::observed("sha256:m1", ts(1)))
        .await
        .unwrap();

    assert!(store.manifest_exists("sha256:m1").await.unwrap());
    assert!(store.links("sha256:m1").await.unwrap().is_empty());
    assert_eq!(store.blob_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pull_manifest_cascades_to_linked_blobs() {
    let store = store().await;
    store
        .push_manifest(&manifest_with_blobs("sha256:m1", ts(1), &["sha256:c", "sha256:l1"]))
        .await
        .unwrap();
    store.push_blob(&blob_pushed("sha256:other", ts(1))).await.unwrap();

    store
        .pull_manifest(&Manifest::observed("sha256:m1", ts(7)))
        .await
        .unwrap();

    let manifest = store.manifest("sha256:m1").await.unwrap().unwrap();
    assert_eq!(manifest.pushed, ts(1));
    assert_eq!(manifest.pulled, Some(ts(7)));
    assert_eq!(store.blob("sha256:c").await.unwrap().unwrap().pulled, Some(ts(7)));
    assert_eq!(store.blob("sha256:l1").await.unwrap().unwrap().pulled, Some(ts(7)));
    assert_eq!(store.blob("sha256:other").await.unwrap().unwrap().pulled, None);
}

#[tokio::test]
async fn test_pull_unknown_manifest_creates_it() {
    let store = store().await;
    store
        .pull_manifest(&Manifest::observed("sha256:m1", ts(3)))
        .await
        .unwrap();
    let row = store.manifest("sha256:m1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(3));
    assert_eq!(row.pulled, Some(ts(3)));
}

#[tokio::test]
async fn test_push_tag_retargets() {
    let store = store().await;
    for digest in ["sha256:m1", "sha256:m2"] {
        store
            .push_manifest(&Manifest::observed(digest, ts(1)))
            .await
            .unwrap();
    }

    store.push_tag(&tag("1.0", "sha256:m1", ts(1))).await.unwrap();
    store.push_tag(&tag("1.0", "sha256:m2", ts(2))).await.unwrap();

    let row = store.tag("reg.io/team/app:1.0").await.unwrap().unwrap();
    assert_eq!(row.manifest_digest, "sha256:m2");
    assert_eq!(row.pushed, ts(2));
    assert_eq!(row.pulled, None);
    assert_eq!(row.tag.as_deref(), Some("1.0"));
}

#[tokio::test]
async fn test_pull_tag_refreshes_pulled_only() {
    let store = store().await;
    store
        .push_manifest(&Manifest::observed("sha256:m1", ts(1)))
        .await
        .unwrap();
    store.push_tag(&tag("1.0", "sha256:m1", ts(1))).await.unwrap();

    store.pull_tag(&tag("1.0", "sha256:m1", ts(5))).await.unwrap();

    let row = store.tag("reg.io/team/app:1.0").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(1));
    assert_eq!(row.pulled, Some(ts(5)));
}

#[tokio::test]
async fn test_untagged_reference_stores_null_tag() {
    let store = store().await;
    store
        .push_manifest(&Manifest::observed("sha256:m1", ts(1)))
        .await
        .unwrap();
    store.push_tag(&tag("", "sha256:m1", ts(1))).await.unwrap();

    let row = store.tag("reg.io/team/app").await.unwrap().unwrap();
    assert_eq!(row.tag, None);
}

#[tokio::test]
async fn test_tag_requires_live_manifest() {
    let store = store().await;
    let result = store.push_tag(&tag("1.0", "sha256:missing", ts(1))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_manifest_cascades_tags_and_links() {
    let store = store().await;
    store
        .push_manifest(&manifest_with_blobs("sha256:m1", ts(1), &["sha256:c", "sha256:l1"]))
        .await
        .unwrap();
    store.push_tag(&tag("1.0", "sha256:m1", ts(1))).await.unwrap();
    store.pull_tag(&tag("1.0", "sha256:m1", ts(2))).await.unwrap();
    store.push_tag(&tag("latest", "sha256:m1", ts(1))).await.unwrap();

    assert!(store.delete_manifest("sha256:m1", ts(9)).await.unwrap());

    assert!(!store.manifest_exists("sha256:m1").await.unwrap());
    assert!(store.tag("reg.io/team/app:1.0").await.unwrap().is_none());
    assert!(store.tag("reg.io/team/app:latest").await.unwrap().is_none());
    assert!(store.links("sha256:m1").await.unwrap().is_empty());

    // Blobs outlive the manifest.
    assert!(store.blob_exists("sha256:c").await.unwrap());
    assert!(store.blob_exists("sha256:l1").await.unwrap());

    let manifest = store.deleted_manifest("sha256:m1").await.unwrap().unwrap();
    assert_eq!(manifest.pushed, ts(1));
    assert_eq!(manifest.deleted, ts(9));

    let archived_tag = store.deleted_tag("reg.io/team/app:1.0").await.unwrap().unwrap();
    assert_eq!(archived_tag.manifest_digest, "sha256:m1");
    assert_eq!(archived_tag.pulled, Some(ts(2)));
    assert_eq!(archived_tag.deleted, ts(9));
    assert!(store
        .deleted_tag("reg.io/team/app:latest")
        .await
        .unwrap()
        .is_some());

    assert_eq!(store.deleted_links("sha256:m1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_redelete_manifest_merges_tag_archive() {
    let store = store().await;
    store
        .push_manifest(&Manifest::observed("sha256:m1", ts(1)))
        .await
        .unwrap();
    store.push_tag(&tag("1.0", "sha256:m1", ts(1))).await.unwrap();
    store.delete_manifest("sha256:m1", ts(2)).await.unwrap();

    store
        .push_manifest(&Manifest::observed("sha256:m2", ts(3)))
        .await
        .unwrap();
    store.push_tag(&tag("1.0", "sha256:m2", ts(3))).await.unwrap();
    store.delete_manifest("sha256:m2", ts(4)).await.unwrap();

    let archived = store.deleted_tag("reg.io/team/app:1.0").await.unwrap().unwrap();
    assert_eq!(archived.manifest_digest, "sha256:m2");
    assert_eq!(archived.pushed, ts(3));
    assert_eq!(archived.deleted, ts(4));
}

#[tokio::test]
async fn test_concurrent_pushes_converge() {
    let store = Arc::new(store().await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.push_blob(&blob_pushed("sha256:b1", ts(i))).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.blob_count().await.unwrap(), 1);
    let row = store.blob("sha256:b1").await.unwrap().unwrap();
    assert!((0..16).map(ts).any(|at| at == row.pushed));

    // The last committed write wins, even with an older timestamp.
    store.push_blob(&blob_pushed("sha256:b1", ts(-5))).await.unwrap();
    assert_eq!(store.blob_count().await.unwrap(), 1);
    let row = store.blob("sha256:b1").await.unwrap().unwrap();
    assert_eq!(row.pushed, ts(-5));

    assert!(store.blob_exists("sha256:b1").await.unwrap());
    assert!(!store.delete_blob("sha256:b2", ts(0)).await.unwrap());
    assert!(store.delete_blob("sha256:b1", ts(99)).await.unwrap());
    assert!(!store.blob_exists("sha256:b1").await.unwrap());
}

#[tokio::test]
async fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("audit.db");

    {
        let store = SqliteStore::new(&path).await.unwrap();
        store.push_blob(&blob_pushed("sha256:b1", ts(1))).await.unwrap();
        store.pool().close().await;
    }

    let store = SqliteStore::new(&path).await.unwrap();
    assert!(store.blob_exists("sha256:b1").await.unwrap());
}

#[tokio::test]
async fn test_connect_from_config() {
    let config = DatabaseConfig::from_url("sqlite::memory:", 1).unwrap();
    let store = connect(&config).await.unwrap();
    assert_eq!(store.backend(), Backend::Sqlite);
    store.health_check().await.unwrap();
    store.migrate().await.unwrap();
}
