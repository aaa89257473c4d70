//! Static registry login credentials.
//!
//! Credentials are read from a docker `config.json` and keyed by the exact
//! host (`host[:port]`) the registry is addressed by.

use std::collections::HashMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::RegistryError;

/// Per-host basic credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Host to base64 encoded `user:password`.
    auths: HashMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut hosts: Vec<_> = self.auths.keys().collect();
        hosts.sort();
        f.debug_struct("Credentials").field("hosts", &hosts).finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DockerConfig {
    auths: HashMap<String, DockerAuth>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DockerAuth {
    auth: String,
    username: String,
    password: String,
}

impl Credentials {
    /// Creates an empty credential table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a username and password for `host`.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_registry::Credentials;
    ///
    /// let creds = Credentials::new().with_basic("registry.example.com", "user", "pass");
    /// assert_eq!(
    ///     creds.basic_auth("registry.example.com").as_deref(),
    ///     Some("Basic dXNlcjpwYXNz")
    /// );
    /// assert!(creds.basic_auth("other.example.com").is_none());
    /// ```
    #[must_use]
    pub fn with_basic(self, host: impl Into<String>, username: &str, password: &str) -> Self {
        self.with_encoded(host, STANDARD.encode(format!("{username}:{password}")))
    }

    /// Adds an already base64 encoded `user:password` for `host`.
    #[must_use]
    pub fn with_encoded(mut self, host: impl Into<String>, encoded: impl Into<String>) -> Self {
        self.auths.insert(host.into(), encoded.into());
        self
    }

    /// Parses the contents of a docker `config.json`.
    ///
    /// Each `auths` entry contributes its `auth` field, or failing that its
    /// `username` and `password`. Entries with neither are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::JsonError`] if the document is not valid JSON.
    pub fn from_docker_config(json: &str) -> Result<Self, RegistryError> {
        let config: DockerConfig = serde_json::from_str(json)?;
        let mut creds = Self::new();
        for (host, entry) in config.auths {
            if !entry.auth.is_empty() {
                creds = creds.with_encoded(host, entry.auth);
            } else if !entry.username.is_empty() {
                creds = creds.with_basic(host, &entry.username, &entry.password);
            }
        }
        Ok(creds)
    }

    /// Loads a docker `config.json` from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_docker_config(&json).map_err(|err| match err {
            RegistryError::JsonError { source } => RegistryError::InvalidConfigFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Returns the `Authorization` header value for `host`, if one is known.
    #[must_use]
    pub fn basic_auth(&self, host: &str) -> Option<String> {
        self.auths.get(host).map(|encoded| format!("Basic {encoded}"))
    }

    /// Returns the number of hosts with credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.auths.len()
    }

    /// Returns true if no credentials are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auths.is_empty()
    }
}
