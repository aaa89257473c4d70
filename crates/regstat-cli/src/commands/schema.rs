//! Schema command: print or apply the audit store DDL.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use regstat_audit::{Backend, DatabaseConfig};

/// Database backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// PostgreSQL
    Postgres,
    /// SQLite
    Sqlite,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Postgres => Self::Postgres,
            BackendArg::Sqlite => Self::Sqlite,
        }
    }
}

/// Arguments for the schema command.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Backend whose DDL to print
    #[arg(long, value_enum, default_value = "postgres")]
    pub backend: BackendArg,

    /// Apply the schema to this database instead of printing it
    #[arg(long, value_name = "DATABASE_URL")]
    pub apply: Option<String>,
}

/// Execute the schema command.
pub async fn execute(args: SchemaArgs) -> Result<()> {
    let Some(url) = args.apply else {
        print!("{}", Backend::from(args.backend).schema());
        return Ok(());
    };

    let config = DatabaseConfig::from_url(&url, 1).context("Invalid database URL")?;
    let store = regstat_audit::connect(&config)
        .await
        .context("Failed to apply schema")?;
    store.health_check().await.context("Database health check failed")?;
    println!("Schema applied ({:?})", config.backend());
    Ok(())
}
