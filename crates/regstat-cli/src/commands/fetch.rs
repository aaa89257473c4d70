//! Fetch command implementation.
//!
//! Runs the same manifest fetch the workflow uses to enrich pushes, which is
//! handy for checking credentials against a registry.

use anyhow::{Context, Result};
use clap::Args;
use regstat_registry::ManifestFetcher;

use super::RegistryArgs;

/// Arguments for the fetch command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Manifest URL, e.g. `https://reg.io/v2/team/app/manifests/latest`
    pub url: String,

    /// Print the whole manifest document as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryArgs,
}

/// Execute the fetch command.
pub async fn execute(args: FetchArgs) -> Result<()> {
    let client = args.registry.client()?;
    let manifest = client
        .fetch_manifest(&args.url)
        .await
        .with_context(|| format!("Failed to fetch {}", args.url))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    for digest in manifest.blob_digests() {
        println!("{digest}");
    }
    Ok(())
}
