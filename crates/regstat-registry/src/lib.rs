//! # Regstat Registry
//!
//! Docker registry access for the regstat audit service.
//!
//! Registry push notifications name a manifest but not the blobs it is built
//! from. This crate re-fetches the manifest document so the blobs can be
//! recorded, and resolves registry host aliases to canonical names.
//!
//! ## Features
//!
//! - **Manifest fetch**: Docker v2 manifests over HTTP(S)
//! - **Two-legged auth**: basic credential first, bearer token on challenge
//! - **Docker credentials**: per-host logins read from `config.json`
//! - **Equivalences**: many-to-one registry host aliasing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regstat_registry::{Credentials, ManifestFetcher, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new()
//!         .with_credentials(Credentials::load("/root/.docker/config.json")?);
//!     let client = RegistryClient::new(config)?;
//!
//!     let manifest = client
//!         .fetch_manifest("https://registry.example.com/v2/app/manifests/latest")
//!         .await?;
//!     for digest in manifest.blob_digests() {
//!         println!("{digest}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Auth Flow
//!
//! ```text
//!  GET manifest (Basic?) ──200──► decode
//!        │
//!       401 + Www-Authenticate: Bearer realm,service,scope
//!        │
//!  GET realm?service&scope (Basic?) ──non-200──► TokenFetch
//!        │
//!  GET manifest (Bearer token) ──non-200──► AuthenticationFailed
//!        │
//!       200 ──► decode
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod challenge;
mod client;
mod config;
mod credentials;
mod equivalent;
mod error;
mod oci;

pub use challenge::BearerChallenge;
pub use client::{ManifestFetcher, RegistryClient};
pub use config::{RegistryConfig, TlsConfig, DEFAULT_TIMEOUT};
pub use credentials::Credentials;
pub use equivalent::EquivalentRegistries;
pub use error::RegistryError;
pub use oci::{Descriptor, ImageManifest, MediaType};
