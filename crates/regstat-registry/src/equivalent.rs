//! Registry name equivalences.
//!
//! A registry is often reachable under several names (`reg.io`,
//! `reg.io:443`, an internal alias). The equivalence table folds every alias
//! onto one canonical name so tags pushed through different hosts share a
//! single audit key.
//!
//! The on-disk form maps each canonical name to its aliases:
//!
//! ```json
//! {
//!   "my.registry.com": ["my.registry.com:443", "my.registry.com:8443"],
//!   "other.registry.co.uk": ["other.registry.com", "other.registry.org"]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::RegistryError;

/// Immutable many-to-one mapping from alias host to canonical registry name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalentRegistries {
    aliases: HashMap<String, String>,
    groups: usize,
}

impl EquivalentRegistries {
    /// Creates an empty table in which every host resolves to itself.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from canonical name to alias groups.
    ///
    /// When an alias is listed under more than one canonical name, the
    /// lexicographically smallest canonical name wins.
    #[must_use]
    pub fn from_groups(groups: BTreeMap<String, Vec<String>>) -> Self {
        let mut aliases = HashMap::new();
        for (canonical, members) in &groups {
            for alias in members {
                aliases
                    .entry(alias.clone())
                    .or_insert_with(|| canonical.clone());
            }
        }
        Self {
            aliases,
            groups: groups.len(),
        }
    }

    /// Adds a group, returning the extended table.
    ///
    /// Aliases already mapped keep their existing canonical name.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_registry::EquivalentRegistries;
    ///
    /// let equivs = EquivalentRegistries::new()
    ///     .with_group("reg.io", ["reg.io:443", "mirror.reg.io"]);
    /// assert_eq!(equivs.resolve("reg.io:443"), "reg.io");
    /// assert_eq!(equivs.resolve("reg.io"), "reg.io");
    /// assert_eq!(equivs.resolve("other.io"), "other.io");
    /// ```
    #[must_use]
    pub fn with_group<I, S>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let canonical = canonical.into();
        for alias in aliases {
            self.aliases
                .entry(alias.into())
                .or_insert_with(|| canonical.clone());
        }
        self.groups += 1;
        self
    }

    /// Parses the JSON form of the table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::JsonError`] if the document is not an object
    /// of string arrays.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let groups: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::from_groups(groups))
    }

    /// Loads the table from a JSON file.
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
        Self::from_json(&json).map_err(|err| match err {
            RegistryError::JsonError { source } => RegistryError::InvalidConfigFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Returns the canonical name for `host`, or `host` itself when it is
    /// not a known alias.
    #[must_use]
    pub fn resolve<'a>(&'a self, host: &'a str) -> &'a str {
        self.aliases.get(host).map_or(host, String::as_str)
    }

    /// Returns the number of canonical groups.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.groups
    }

    /// Returns true if the table has no groups.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups == 0
    }
}
