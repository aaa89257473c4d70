//! Docker registry document types.
//!
//! This module defines the image manifest document returned by the registry's
//! manifest endpoint and the token document returned by its auth service.

use serde::{Deserialize, Serialize};

/// Media types used when talking to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(String);

impl MediaType {
    /// Docker image manifest, schema version 2.
    pub const DOCKER_MANIFEST_V2: &'static str =
        "application/vnd.docker.distribution.manifest.v2+json";

    /// Docker container config object.
    pub const DOCKER_CONTAINER_CONFIG: &'static str =
        "application/vnd.docker.container.image.v1+json";

    /// Docker image layer (gzipped tar).
    pub const DOCKER_LAYER_GZIP: &'static str =
        "application/vnd.docker.image.rootfs.diff.tar.gzip";

    /// JSON, used for token requests.
    pub const JSON: &'static str = "application/json";

    /// Creates a new media type.
    #[must_use]
    pub fn new(media_type: impl Into<String>) -> Self {
        Self(media_type.into())
    }

    /// Returns the media type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MediaType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::new("")
    }
}

impl Serialize for MediaType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s))
    }
}

/// Content descriptor.
///
/// A descriptor describes the disposition of targeted content. It includes
/// the type of the content, a content identifier (digest), and the byte-size
/// of the raw content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Descriptor {
    /// Media type of the referenced content.
    pub media_type: MediaType,

    /// Digest of the targeted content.
    pub digest: String,

    /// Size in bytes of the content.
    pub size: u64,

    /// Optional URLs for alternative locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
}

impl Descriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(media_type: MediaType, digest: impl Into<String>, size: u64) -> Self {
        Self {
            media_type,
            digest: digest.into(),
            size,
            urls: None,
        }
    }
}

/// Docker image manifest, schema version 2.
///
/// Describes one image: a config object plus an ordered list of layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageManifest {
    /// Schema version (always 2).
    pub schema_version: u32,

    /// Media type of this manifest.
    pub media_type: MediaType,

    /// Container config descriptor.
    pub config: Descriptor,

    /// Layers in application order.
    pub layers: Vec<Descriptor>,
}

impl ImageManifest {
    /// Returns the digests of every blob the manifest references.
    ///
    /// The config digest comes first, when present, followed by each layer
    /// digest in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_registry::{Descriptor, ImageManifest, MediaType};
    ///
    /// let manifest = ImageManifest {
    ///     config: Descriptor::new(MediaType::DOCKER_CONTAINER_CONFIG.into(), "sha256:c", 10),
    ///     layers: vec![Descriptor::new(MediaType::DOCKER_LAYER_GZIP.into(), "sha256:l", 20)],
    ///     ..ImageManifest::default()
    /// };
    /// assert_eq!(manifest.blob_digests(), vec!["sha256:c", "sha256:l"]);
    /// ```
    #[must_use]
    pub fn blob_digests(&self) -> Vec<&str> {
        let config = Some(self.config.digest.as_str()).filter(|d| !d.is_empty());
        config
            .into_iter()
            .chain(self.layers.iter().map(|l| l.digest.as_str()))
            .collect()
    }
}

/// Response from a registry token endpoint.
///
/// Docker's auth service sends `token`; OAuth2-style services send
/// `access_token`. Either is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

impl TokenResponse {
    /// Returns the first non-empty token field.
    pub(crate) fn into_token(self) -> Option<String> {
        self.token
            .filter(|t| !t.is_empty())
            .or(self.access_token)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_JSON: &str = r#"{
        "schemaVersion": 2,
        "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
        "config": {
            "mediaType": "application/vnd.docker.container.image.v1+json",
            "size": 7023,
            "digest": "sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7"
        },
        "layers": [
            {
                "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                "size": 32654,
                "digest": "sha256:e692418e4cbaf90ca69d05a66403747baa33ee08806650b51fab815ad7fc331f"
            },
            {
                "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                "size": 16724,
                "digest": "sha256:3c3a4604a545cdc127456d94e421cd355bca5b528f4a9c1905b15da2eb4a4c6b"
            }
        ]
    }"#;

    #[test]
    fn test_manifest_deserialization() {
        let manifest: ImageManifest = serde_json::from_str(MANIFEST_JSON).unwrap();
        assert_eq!(manifest.schema_version, 2);
        assert_eq!(manifest.media_type.as_str(), MediaType::DOCKER_MANIFEST_V2);
        assert_eq!(manifest.config.size, 7023);
        assert_eq!(manifest.layers.len(), 2);
    }

    #[test]
    fn test_blob_digests_config_first() {
        let manifest: ImageManifest = serde_json::from_str(MANIFEST_JSON).unwrap();
        let digests = manifest.blob_digests();
        assert_eq!(digests.len(), 3);
        assert!(digests[0].starts_with("sha256:b5b2"));
        assert!(digests[1].starts_with("sha256:e692"));
        assert!(digests[2].starts_with("sha256:3c3a"));
    }

    #[test]
    fn test_blob_digests_without_config() {
        let manifest: ImageManifest =
            serde_json::from_str(r#"{"schemaVersion":2,"layers":[{"digest":"sha256:l1"}]}"#)
                .unwrap();
        assert_eq!(manifest.blob_digests(), vec!["sha256:l1"]);
    }

    #[test]
    fn test_token_response_prefers_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"token":"abc","access_token":"def"}"#).unwrap();
        assert_eq!(response.into_token(), Some("abc".to_string()));
    }

    #[test]
    fn test_token_response_access_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"def","expires_in":300}"#).unwrap();
        assert_eq!(response.into_token(), Some("def".to_string()));
    }

    #[test]
    fn test_token_response_empty() {
        let response: TokenResponse = serde_json::from_str(r#"{"token":""}"#).unwrap();
        assert_eq!(response.into_token(), None);
    }
}
