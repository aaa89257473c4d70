//! Registry notification wire model.
//!
//! A registry configured with a notification endpoint posts an [`Envelope`]
//! holding one or more [`Event`]s. Fields the registry leaves out decode to
//! their defaults, so partially populated events are accepted as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Media types regstat knows how to classify.
pub mod media_type {
    /// Generic binary blob.
    pub const OCTET_STREAM: &str = "application/octet-stream";

    /// Docker image layer (gzipped tar).
    pub const DOCKER_LAYER_GZIP: &str = "application/vnd.docker.image.rootfs.diff.tar.gzip";

    /// Docker image manifest, schema version 2.
    pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

    /// Content type of the notification envelope itself.
    pub const NOTIFICATION_ENVELOPE: &str =
        "application/vnd.docker.distribution.events.v1+json";
}

/// A batch of notification events as posted by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Events in delivery order.
    pub events: Vec<Event>,
}

impl Envelope {
    /// Decodes an envelope from a request body.
    ///
    /// An empty body yields an empty envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEnvelope`] if the body is not a valid envelope.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_core::Envelope;
    ///
    /// let envelope = Envelope::from_slice(br#"{"events":[{"action":"push"}]}"#)?;
    /// assert_eq!(envelope.events.len(), 1);
    ///
    /// assert!(Envelope::from_slice(b"")?.events.is_empty());
    /// # Ok::<(), regstat_core::Error>(())
    /// ```
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|source| Error::MalformedEnvelope { source })
    }
}

/// What happened to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Content was uploaded.
    Push,
    /// Content was downloaded.
    Pull,
    /// Content was removed.
    Delete,
    /// A blob was mounted from another repository.
    Mount,
    /// Any action this version does not understand.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Returns the wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Delete => "delete",
            Self::Mount => "mount",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Registry-assigned event id.
    pub id: String,

    /// When the registry observed the action.
    pub timestamp: DateTime<Utc>,

    /// The action that was performed.
    pub action: Action,

    /// The content the action applied to.
    pub target: Target,

    /// The request that triggered the event.
    pub request: Request,

    /// Who performed the action, when known.
    pub actor: Actor,

    /// The registry node that emitted the event.
    pub source: Source,
}

impl Event {
    /// Classifies the event's target.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        self.target.kind()
    }
}

/// The content an event refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Target {
    /// Media type of the referenced content.
    pub media_type: String,

    /// Size in bytes.
    pub size: i64,

    /// Content digest, e.g. `sha256:...`.
    pub digest: String,

    /// Length in bytes (same as `size`).
    pub length: i64,

    /// Repository name.
    pub repository: String,

    /// Direct URL of the content.
    pub url: String,

    /// Tag, empty for digest references.
    pub tag: String,
}

impl Target {
    /// Resolves the media type into a [`TargetKind`].
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_core::{Target, TargetKind};
    ///
    /// let target = Target {
    ///     media_type: "application/octet-stream".to_string(),
    ///     ..Target::default()
    /// };
    /// assert_eq!(target.kind(), TargetKind::Blob);
    /// ```
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        TargetKind::from_media_type(&self.media_type)
    }
}

/// Explicit classification of an event target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A layer or config blob.
    Blob,
    /// An image manifest.
    Manifest,
    /// Anything else, carrying the unrecognised media type.
    Other(String),
}

impl TargetKind {
    /// Maps a media type string onto a target kind.
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            media_type::OCTET_STREAM | media_type::DOCKER_LAYER_GZIP => Self::Blob,
            media_type::DOCKER_MANIFEST_V2 => Self::Manifest,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The inbound request that produced an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Request id.
    pub id: String,

    /// Client address.
    pub addr: String,

    /// Host the client addressed the registry by.
    pub host: String,

    /// HTTP method.
    pub method: String,

    /// Client user agent.
    pub useragent: String,
}

/// The authenticated principal behind an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// Principal name, empty for anonymous access.
    pub name: String,
}

/// The registry node that emitted an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Node address.
    pub addr: String,

    /// Node instance id.
    #[serde(rename = "instanceID")]
    pub instance_id: String,
}
