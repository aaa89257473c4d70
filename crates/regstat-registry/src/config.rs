//! Configuration types for registry client.

use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::Credentials;

/// Default request timeout for registry calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Basic credentials, keyed by registry host.
    pub credentials: Credentials,

    /// Request timeout.
    pub timeout: Duration,

    /// TLS configuration.
    pub tls: Option<TlsConfig>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryConfig {
    /// Creates a configuration with no credentials and the default timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use regstat_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new();
    /// assert!(config.credentials.is_empty());
    /// assert!(config.user_agent.starts_with("regstat/"));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            credentials: Credentials::new(),
            timeout: DEFAULT_TIMEOUT,
            tls: None,
            user_agent: format!("regstat/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the credential table.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Overrides the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// TLS configuration for registry connections.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Path to an extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,

    /// Whether to skip certificate verification (NOT recommended for production).
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Creates a new TLS configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ca_cert: None,
            insecure_skip_verify: false,
        }
    }

    /// Sets the CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Enables insecure mode (skips certificate verification).
    ///
    /// # Warning
    ///
    /// This should only be used for testing. Never use in production.
    #[must_use]
    pub const fn insecure(mut self) -> Self {
        self.insecure_skip_verify = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = RegistryConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.tls.is_none());
        assert_eq!(
            config.user_agent,
            format!("regstat/{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_config_builders() {
        let config = RegistryConfig::new()
            .with_credentials(Credentials::new().with_basic("reg.io", "u", "p"))
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("custom/1");
        assert_eq!(config.credentials.len(), 1);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "custom/1");
    }

    #[test]
    fn test_tls_config() {
        let tls = TlsConfig::new().with_ca_cert("/path/to/ca.crt");
        assert_eq!(tls.ca_cert, Some(PathBuf::from("/path/to/ca.crt")));
        assert!(!tls.insecure_skip_verify);
        assert!(tls.insecure().insecure_skip_verify);
    }
}
