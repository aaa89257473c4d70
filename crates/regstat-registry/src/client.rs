//! Docker registry HTTP client.
//!
//! Push notifications name a manifest but not the blobs it references, so the
//! manifest document is re-fetched from the registry. Access follows the
//! registry token flow: the request is first sent with the host's basic
//! credential (if any); a `401` carrying a bearer challenge is answered by
//! fetching a token from the challenge's realm and retrying once.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::challenge::BearerChallenge;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::oci::{ImageManifest, MediaType, TokenResponse};

/// Source of manifest documents.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetches and decodes the manifest document at `url`.
    async fn fetch_manifest(&self, url: &str) -> Result<ImageManifest, RegistryError>;
}

/// Client for fetching manifests from a Docker registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use regstat_registry::{RegistryClient, RegistryConfig};
    ///
    /// let client = RegistryClient::new(RegistryConfig::new())?;
    /// # Ok::<(), regstat_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = Self::build_http_client(&config)?;
        Ok(Self { config, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fetches the manifest at `url`, negotiating bearer auth if challenged.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable, the auth handshake
    /// fails, the registry answers with an unexpected status, or the body is
    /// not a manifest document.
    pub async fn get_manifest(&self, url: &str) -> Result<ImageManifest, RegistryError> {
        let raw = url;
        let url = Url::parse(raw).map_err(|_| RegistryError::InvalidUrl {
            url: raw.to_string(),
        })?;
        let basic = self.config.credentials.basic_auth(host_key(raw));

        let response = self
            .get(url.clone(), MediaType::DOCKER_MANIFEST_V2, basic.as_deref())
            .await?;

        match response.status() {
            StatusCode::OK => Self::decode(response).await,
            StatusCode::UNAUTHORIZED => {
                let header = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| RegistryError::AuthChallenge {
                        message: "401 response without a Www-Authenticate header".to_string(),
                    })?;
                let challenge = BearerChallenge::parse(header)?;
                let token = self.fetch_token(&challenge, basic.as_deref()).await?;

                let bearer = format!("Bearer {token}");
                let response = self
                    .get(url, MediaType::DOCKER_MANIFEST_V2, Some(&bearer))
                    .await?;
                if response.status() != StatusCode::OK {
                    return Err(RegistryError::AuthenticationFailed {
                        status: response.status().as_u16(),
                    });
                }
                Self::decode(response).await
            }
            status => Err(RegistryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Exchanges a bearer challenge for a token.
    async fn fetch_token(
        &self,
        challenge: &BearerChallenge,
        basic: Option<&str>,
    ) -> Result<String, RegistryError> {
        let token_url = challenge.token_url()?;
        tracing::debug!(realm = %challenge.realm, service = %challenge.service, scope = %challenge.scope, "Requesting bearer token");

        let response = self.get(token_url, MediaType::JSON, basic).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(RegistryError::TokenFetch {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| RegistryError::TokenFetch {
                status: status.as_u16(),
                message: format!("invalid token response: {e}"),
            })?;
        token.into_token().ok_or_else(|| RegistryError::TokenFetch {
            status: status.as_u16(),
            message: "token response carried no token".to_string(),
        })
    }

    async fn get(
        &self,
        url: Url,
        accept: &str,
        authorization: Option<&str>,
    ) -> Result<Response, RegistryError> {
        let mut request = self.http.get(url).header(ACCEPT, accept);
        if let Some(auth) = authorization {
            request = request.header(AUTHORIZATION, auth);
        }
        Ok(request.send().await?)
    }

    async fn decode(response: Response) -> Result<ImageManifest, RegistryError> {
        let body = response.bytes().await?;
        let manifest: ImageManifest = serde_json::from_slice(&body)?;
        tracing::debug!(
            blobs = manifest.blob_digests().len(),
            "Fetched manifest document"
        );
        Ok(manifest)
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent);

        if let Some(ref tls) = config.tls {
            if tls.insecure_skip_verify {
                builder = builder.danger_accept_invalid_certs(true);
            }

            if let Some(ref ca_cert) = tls.ca_cert {
                let cert_pem = std::fs::read(ca_cert).map_err(|e| RegistryError::IoError {
                    path: ca_cert.clone(),
                    source: e,
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem).map_err(|e| {
                    RegistryError::InvalidClientConfig {
                        message: format!("Invalid CA certificate: {e}"),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        builder
            .build()
            .map_err(|e| RegistryError::InvalidClientConfig {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ManifestFetcher for RegistryClient {
    async fn fetch_manifest(&self, url: &str) -> Result<ImageManifest, RegistryError> {
        self.get_manifest(url).await
    }
}

/// Credential lookup key: the authority exactly as written in the URL.
///
/// An explicit port is kept even when it is the scheme default, so
/// `https://reg.io:443/...` looks up `reg.io:443`.
fn host_key(raw: &str) -> &str {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host)
}
