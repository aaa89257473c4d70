//! CLI commands and argument parsing.

pub mod fetch;
pub mod replay;
pub mod schema;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use regstat_audit::{AuditStore, DatabaseConfig, DEFAULT_MAX_CONNECTIONS};
use regstat_registry::{
    Credentials, EquivalentRegistries, RegistryClient, RegistryConfig, TlsConfig,
};
use regstat_server::{Dispatcher, Workflow};
use tracing::info;

/// regstat - audit trail for container registry pushes, pulls and deletes
#[derive(Parser)]
#[command(name = "regstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Listen for registry notifications
    Serve(serve::ServeArgs),

    /// Process a saved notification payload
    Replay(replay::ReplayArgs),

    /// Fetch a manifest and list the blobs it references
    Fetch(fetch::FetchArgs),

    /// Print or apply the database schema
    Schema(schema::SchemaArgs),

    /// Print version information
    Version,
}

/// Registry access options.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Docker config.json holding registry credentials
    #[arg(long, env = "REGSTAT_DOCKER_CONFIG")]
    pub docker_config: Option<PathBuf>,

    /// Extra CA certificate (PEM) to trust for registry connections
    #[arg(long, env = "REGSTAT_REGISTRY_CA_CERT")]
    pub registry_ca_cert: Option<PathBuf>,

    /// Skip registry certificate verification
    #[arg(long, env = "REGSTAT_REGISTRY_INSECURE")]
    pub registry_insecure: bool,

    /// Registry request timeout in seconds
    #[arg(long, env = "REGSTAT_REGISTRY_TIMEOUT", default_value = "10")]
    pub registry_timeout: u64,
}

impl RegistryArgs {
    /// Builds the registry client configuration.
    pub fn config(&self) -> Result<RegistryConfig> {
        let credentials = match &self.docker_config {
            Some(path) => Credentials::load(path)
                .with_context(|| format!("Failed to load credentials from {}", path.display()))?,
            None => Credentials::new(),
        };
        info!(registries = credentials.len(), "Loaded registry credentials");

        let mut config = RegistryConfig::new()
            .with_credentials(credentials)
            .with_timeout(Duration::from_secs(self.registry_timeout));

        if self.registry_ca_cert.is_some() || self.registry_insecure {
            let mut tls = TlsConfig::new();
            if let Some(ref ca_cert) = self.registry_ca_cert {
                tls = tls.with_ca_cert(ca_cert);
            }
            if self.registry_insecure {
                tls = tls.insecure();
            }
            config = config.with_tls(tls);
        }

        Ok(config)
    }

    /// Creates the registry client.
    pub fn client(&self) -> Result<RegistryClient> {
        RegistryClient::new(self.config()?).context("Failed to create registry client")
    }
}

/// Audit store options.
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (`postgres://...` or `sqlite:...`)
    #[arg(long, env = "REGSTAT_DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum PostgreSQL pool size
    #[arg(long, env = "REGSTAT_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// Opens and migrates the audit store.
    pub async fn connect(&self) -> Result<Arc<dyn AuditStore>> {
        let config = DatabaseConfig::from_url(&self.database_url, self.max_connections)
            .context("Invalid database URL")?;
        let store = regstat_audit::connect(&config)
            .await
            .context("Failed to open audit store")?;
        info!(backend = ?store.backend(), "Audit store ready");
        Ok(store)
    }
}

/// Workflow options shared by `serve` and `replay`.
#[derive(Args, Debug, Clone)]
pub struct WorkflowArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// JSON file mapping canonical registry names to their aliases
    #[arg(long, env = "REGSTAT_EQUIV_REGISTRIES")]
    pub equiv_registries: Option<PathBuf>,
}

impl WorkflowArgs {
    /// Loads the registry equivalence table.
    pub fn equivalents(&self) -> Result<EquivalentRegistries> {
        let equivalents = match &self.equiv_registries {
            Some(path) => EquivalentRegistries::load(path).with_context(|| {
                format!("Failed to load equivalent registries from {}", path.display())
            })?,
            None => EquivalentRegistries::new(),
        };
        info!(groups = equivalents.len(), "Loaded equivalent registries");
        Ok(equivalents)
    }

    /// Wires the store, the registry client and the workflow together.
    pub async fn dispatcher(&self) -> Result<(Dispatcher, Arc<dyn AuditStore>)> {
        let equivalents = self.equivalents()?;
        let client = self.registry.client()?;
        let store = self.database.connect().await?;

        let workflow = Workflow::new(Arc::clone(&store), Arc::new(client), equivalents);
        Ok((Dispatcher::new(Arc::new(workflow)), store))
    }
}
