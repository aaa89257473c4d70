//! DML shared by every backend.
//!
//! Statements use `$N` placeholders and `ON CONFLICT` upserts, which both
//! PostgreSQL and SQLite accept. Table names are unqualified; the PostgreSQL
//! store resolves them through its `search_path`.

// Blobs

pub(crate) const BLOB_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM blobs WHERE digest = $1)";

pub(crate) const PUSH_BLOB: &str = r"
    INSERT INTO blobs (digest, pushed)
    VALUES ($1, $2)
    ON CONFLICT (digest) DO UPDATE
    SET pushed = EXCLUDED.pushed
";

pub(crate) const PULL_BLOB: &str = r"
    INSERT INTO blobs (digest, pushed, pulled)
    VALUES ($1, $2, $3)
    ON CONFLICT (digest) DO UPDATE
    SET pulled = EXCLUDED.pulled
";

pub(crate) const ARCHIVE_BLOB: &str = r"
    INSERT INTO deleted_blobs (digest, pushed, pulled, deleted)
    SELECT digest, pushed, pulled, $2 FROM blobs
    WHERE digest = $1
    ON CONFLICT (digest) DO UPDATE
    SET pushed = EXCLUDED.pushed,
        pulled = EXCLUDED.pulled,
        deleted = EXCLUDED.deleted
";

pub(crate) const ARCHIVE_BLOB_LINKS: &str = r"
    INSERT INTO deleted_manifest_blob (manifest_digest, blob_digest)
    SELECT manifest_digest, blob_digest FROM manifest_blob
    WHERE blob_digest = $1
    ON CONFLICT (manifest_digest, blob_digest) DO NOTHING
";

pub(crate) const DELETE_BLOB_LINKS: &str = "DELETE FROM manifest_blob WHERE blob_digest = $1";

pub(crate) const DELETE_BLOB: &str = "DELETE FROM blobs WHERE digest = $1";

// Manifests

pub(crate) const MANIFEST_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM manifests WHERE digest = $1)";

pub(crate) const PUSH_MANIFEST: &str = r"
    INSERT INTO manifests (digest, pushed)
    VALUES ($1, $2)
    ON CONFLICT (digest) DO UPDATE
    SET pushed = EXCLUDED.pushed
";

pub(crate) const PULL_MANIFEST: &str = r"
    INSERT INTO manifests (digest, pushed, pulled)
    VALUES ($1, $2, $3)
    ON CONFLICT (digest) DO UPDATE
    SET pulled = EXCLUDED.pulled
";

pub(crate) const LINK_BLOB: &str = r"
    INSERT INTO manifest_blob (manifest_digest, blob_digest)
    VALUES ($1, $2)
    ON CONFLICT (manifest_digest, blob_digest) DO NOTHING
";

pub(crate) const PULL_LINKED_BLOBS: &str = r"
    UPDATE blobs SET pulled = $1
    WHERE digest IN (SELECT blob_digest FROM manifest_blob WHERE manifest_digest = $2)
";

pub(crate) const ARCHIVE_MANIFEST: &str = r"
    INSERT INTO deleted_manifests (digest, pushed, pulled, deleted)
    SELECT digest, pushed, pulled, $2 FROM manifests
    WHERE digest = $1
    ON CONFLICT (digest) DO UPDATE
    SET pushed = EXCLUDED.pushed,
        pulled = EXCLUDED.pulled,
        deleted = EXCLUDED.deleted
";

pub(crate) const ARCHIVE_MANIFEST_TAGS: &str = r"
    INSERT INTO deleted_tags
        (name, registry, repository, tag, manifest_digest, pushed, pulled, deleted)
    SELECT name, registry, repository, tag, manifest_digest, pushed, pulled, $2 FROM tags
    WHERE manifest_digest = $1
    ON CONFLICT (name) DO UPDATE
    SET registry = EXCLUDED.registry,
        repository = EXCLUDED.repository,
        tag = EXCLUDED.tag,
        manifest_digest = EXCLUDED.manifest_digest,
        pushed = EXCLUDED.pushed,
        pulled = EXCLUDED.pulled,
        deleted = EXCLUDED.deleted
";

pub(crate) const ARCHIVE_MANIFEST_LINKS: &str = r"
    INSERT INTO deleted_manifest_blob (manifest_digest, blob_digest)
    SELECT manifest_digest, blob_digest FROM manifest_blob
    WHERE manifest_digest = $1
    ON CONFLICT (manifest_digest, blob_digest) DO NOTHING
";

pub(crate) const DELETE_MANIFEST_TAGS: &str = "DELETE FROM tags WHERE manifest_digest = $1";

pub(crate) const DELETE_MANIFEST_LINKS: &str = "DELETE FROM manifest_blob WHERE manifest_digest = $1";

pub(crate) const DELETE_MANIFEST: &str = "DELETE FROM manifests WHERE digest = $1";

// Tags

pub(crate) const PUSH_TAG: &str = r"
    INSERT INTO tags (name, registry, repository, tag, manifest_digest, pushed)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (name) DO UPDATE
    SET manifest_digest = EXCLUDED.manifest_digest,
        pushed = EXCLUDED.pushed
";

pub(crate) const PULL_TAG: &str = r"
    INSERT INTO tags (name, registry, repository, tag, manifest_digest, pushed, pulled)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (name) DO UPDATE
    SET pulled = EXCLUDED.pulled
";

// Lookups

pub(crate) const SELECT_BLOB: &str = "SELECT digest, pushed, pulled FROM blobs WHERE digest = $1";

pub(crate) const SELECT_MANIFEST: &str = "SELECT digest, pushed, pulled FROM manifests WHERE digest = $1";

pub(crate) const SELECT_TAG: &str = r"
    SELECT name, registry, repository, tag, manifest_digest, pushed, pulled
    FROM tags WHERE name = $1
";

pub(crate) const SELECT_DELETED_BLOB: &str =
    "SELECT digest, pushed, pulled, deleted FROM deleted_blobs WHERE digest = $1";

pub(crate) const SELECT_DELETED_MANIFEST: &str =
    "SELECT digest, pushed, pulled, deleted FROM deleted_manifests WHERE digest = $1";

pub(crate) const SELECT_DELETED_TAG: &str = r"
    SELECT name, registry, repository, tag, manifest_digest, pushed, pulled, deleted
    FROM deleted_tags WHERE name = $1
";

pub(crate) const SELECT_LINKS: &str = r"
    SELECT manifest_digest, blob_digest FROM manifest_blob
    WHERE manifest_digest = $1 OR blob_digest = $1
    ORDER BY manifest_digest, blob_digest
";

pub(crate) const SELECT_DELETED_LINKS: &str = r"
    SELECT manifest_digest, blob_digest FROM deleted_manifest_blob
    WHERE manifest_digest = $1 OR blob_digest = $1
    ORDER BY manifest_digest, blob_digest
";

pub(crate) const COUNT_BLOBS: &str = "SELECT COUNT(*) FROM blobs";
