//! Recording doubles shared by the workflow, dispatch and router tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use regstat_audit::{AuditError, AuditResult, AuditStore, Backend, BlobRepo, ManifestRepo, TagRepo};
use regstat_core::{media_type, Action, Blob, Event, Manifest, Tag};
use regstat_registry::{Descriptor, ImageManifest, ManifestFetcher, MediaType, RegistryError};

use crate::error::WorkflowError;
use crate::workflow::{EventHandler, Outcome};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn blob_event(action: Action, digest: &str, timestamp: DateTime<Utc>) -> Event {
    let mut event = Event {
        action,
        timestamp,
        ..Event::default()
    };
    event.target.media_type = media_type::OCTET_STREAM.to_string();
    event.target.digest = digest.to_string();
    event.target.repository = "team/app".to_string();
    event.request.host = "registry.test".to_string();
    event
}

pub fn manifest_event(action: Action, digest: &str, tag: &str, timestamp: DateTime<Utc>) -> Event {
    let mut event = blob_event(action, digest, timestamp);
    event.target.media_type = media_type::DOCKER_MANIFEST_V2.to_string();
    event.target.tag = tag.to_string();
    event.target.url = format!("http://registry.test/v2/team/app/manifests/{digest}");
    event
}

/// One store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PushBlob(Blob),
    PullBlob(Blob),
    DeleteBlob(String, DateTime<Utc>),
    PushManifest(Manifest),
    PullManifest(Manifest),
    DeleteManifest(String, DateTime<Utc>),
    PushTag(Tag),
    PullTag(Tag),
}

/// Store that records mutations and answers existence probes from fixed sets.
#[derive(Debug, Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<Call>>,
    manifests: HashSet<String>,
    blobs: HashSet<String>,
    fail: bool,
    unhealthy: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, digest: &str) -> Self {
        self.manifests.insert(digest.to_string());
        self
    }

    pub fn with_blob(mut self, digest: &str) -> Self {
        self.blobs.insert(digest.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> AuditResult<()> {
        if self.fail {
            return Err(AuditError::Config("store unavailable".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl BlobRepo for RecordingStore {
    async fn blob_exists(&self, digest: &str) -> AuditResult<bool> {
        Ok(self.blobs.contains(digest))
    }

    async fn push_blob(&self, blob: &Blob) -> AuditResult<()> {
        self.record(Call::PushBlob(blob.clone()))
    }

    async fn pull_blob(&self, blob: &Blob) -> AuditResult<()> {
        self.record(Call::PullBlob(blob.clone()))
    }

    async fn delete_blob(&self, digest: &str, deleted: DateTime<Utc>) -> AuditResult<bool> {
        self.record(Call::DeleteBlob(digest.to_string(), deleted))?;
        Ok(self.blobs.contains(digest))
    }
}

#[async_trait]
impl ManifestRepo for RecordingStore {
    async fn manifest_exists(&self, digest: &str) -> AuditResult<bool> {
        Ok(self.manifests.contains(digest))
    }

    async fn push_manifest(&self, manifest: &Manifest) -> AuditResult<()> {
        self.record(Call::PushManifest(manifest.clone()))
    }

    async fn pull_manifest(&self, manifest: &Manifest) -> AuditResult<()> {
        self.record(Call::PullManifest(manifest.clone()))
    }

    async fn delete_manifest(&self, digest: &str, deleted: DateTime<Utc>) -> AuditResult<bool> {
        self.record(Call::DeleteManifest(digest.to_string(), deleted))?;
        Ok(self.manifests.contains(digest))
    }
}

#[async_trait]
impl TagRepo for RecordingStore {
    async fn push_tag(&self, tag: &Tag) -> AuditResult<()> {
        self.record(Call::PushTag(tag.clone()))
    }

    async fn pull_tag(&self, tag: &Tag) -> AuditResult<()> {
        self.record(Call::PullTag(tag.clone()))
    }
}

#[async_trait]
impl AuditStore for RecordingStore {
    async fn migrate(&self) -> AuditResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> AuditResult<()> {
        if self.unhealthy {
            return Err(AuditError::Config("database unreachable".to_string()));
        }
        Ok(())
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }
}

/// Fetcher that serves one canned manifest document, or always fails.
#[derive(Debug, Clone)]
pub struct StubFetcher {
    document: Option<ImageManifest>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn with_blobs(config: &str, layers: &[&str]) -> Self {
        let document = ImageManifest {
            schema_version: 2,
            media_type: MediaType::new(MediaType::DOCKER_MANIFEST_V2),
            config: Descriptor::new(MediaType::new(MediaType::DOCKER_CONTAINER_CONFIG), config, 10),
            layers: layers
                .iter()
                .map(|digest| Descriptor::new(MediaType::new(MediaType::DOCKER_LAYER_GZIP), *digest, 100))
                .collect(),
        };
        Self {
            document: Some(document),
            requested: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            document: None,
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestFetcher for StubFetcher {
    async fn fetch_manifest(&self, url: &str) -> Result<ImageManifest, RegistryError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.document.clone().ok_or_else(|| RegistryError::UnexpectedStatus {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Handler that records which action each event was routed to.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    routed: Mutex<Vec<(Action, String)>>,
    fail_digest: Option<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(digest: &str) -> Self {
        Self {
            routed: Mutex::default(),
            fail_digest: Some(digest.to_string()),
        }
    }

    pub fn routed(&self) -> Vec<(Action, String)> {
        self.routed.lock().unwrap().clone()
    }

    fn route(&self, action: Action, event: &Event, outcome: Outcome) -> Result<Outcome, WorkflowError> {
        self.routed
            .lock()
            .unwrap()
            .push((action, event.target.digest.clone()));
        if self.fail_digest.as_deref() == Some(event.target.digest.as_str()) {
            return Err(WorkflowError::persistence("record", event.target.digest.as_str())(
                AuditError::Config("store unavailable".to_string()),
            ));
        }
        Ok(outcome)
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn process_push(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        self.route(Action::Push, event, Outcome::BlobPushed)
    }

    async fn process_pull(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        self.route(Action::Pull, event, Outcome::BlobPulled)
    }

    async fn process_delete(&self, event: &Event) -> Result<Outcome, WorkflowError> {
        self.route(Action::Delete, event, Outcome::UnknownDigest)
    }
}
