//! Audit entities built from notification events.
//!
//! These are the transient, per-event representations the workflow hands to
//! the audit store. Timestamps are always registry-event timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content-addressed blob (layer or config object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Content digest, the unique key.
    pub digest: String,

    /// When the blob was pushed.
    pub pushed: DateTime<Utc>,

    /// When the blob was last pulled.
    pub pulled: DateTime<Utc>,
}

impl Blob {
    /// Creates a blob observed at `timestamp`, with both times set to it.
    #[must_use]
    pub fn observed(digest: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            digest: digest.into(),
            pushed: timestamp,
            pulled: timestamp,
        }
    }
}

/// An image manifest and the blobs it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest digest, the unique key.
    pub digest: String,

    /// When the manifest was pushed.
    pub pushed: DateTime<Utc>,

    /// When the manifest was last pulled.
    pub pulled: DateTime<Utc>,

    /// Referenced blobs: config first, then layers in order.
    pub blobs: Vec<Blob>,
}

impl Manifest {
    /// Creates a manifest observed at `timestamp` with no known blobs.
    #[must_use]
    pub fn observed(digest: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            digest: digest.into(),
            pushed: timestamp,
            pulled: timestamp,
            blobs: Vec::new(),
        }
    }

    /// Appends a blob reference seen at `timestamp`.
    pub fn add_blob(&mut self, digest: impl Into<String>, timestamp: DateTime<Utc>) {
        self.blobs.push(Blob::observed(digest, timestamp));
    }

    /// Returns the digests of the referenced blobs, in order.
    #[must_use]
    pub fn blob_digests(&self) -> Vec<&str> {
        self.blobs.iter().map(|b| b.digest.as_str()).collect()
    }
}

/// A named pointer from `registry/repository[:tag]` to a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Canonical display name, the unique key.
    pub name: String,

    /// Registry host as addressed by the client (not canonicalised).
    pub registry: String,

    /// Repository name.
    pub repository: String,

    /// Tag label, empty for digest references.
    pub tag: String,

    /// Digest of the manifest the tag points at.
    pub manifest_digest: String,

    /// When the tag was pushed.
    pub pushed: DateTime<Utc>,

    /// When the tag was last pulled.
    pub pulled: DateTime<Utc>,
}

impl Tag {
    /// Composes a tag's display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_core::Tag;
    ///
    /// assert_eq!(Tag::compose_name("reg.io", "team/app", "1.0"), "reg.io/team/app:1.0");
    /// assert_eq!(Tag::compose_name("reg.io", "team/app", ""), "reg.io/team/app");
    /// ```
    #[must_use]
    pub fn compose_name(registry: &str, repository: &str, tag: &str) -> String {
        if tag.is_empty() {
            format!("{registry}/{repository}")
        } else {
            format!("{registry}/{repository}:{tag}")
        }
    }

    /// Returns true if this is a digest reference with no tag label.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tag.is_empty()
    }
}
