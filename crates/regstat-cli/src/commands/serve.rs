//! Serve command: listen for registry notifications.

use anyhow::{Context, Result};
use clap::Args;
use regstat_server::{Server, ServerConfig, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PORT};
use tracing::info;

use super::WorkflowArgs;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "REGSTAT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum notification payloads processed at once
    #[arg(long, env = "REGSTAT_MAX_IN_FLIGHT", default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    pub max_in_flight: usize,

    #[command(flatten)]
    pub workflow: WorkflowArgs,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let (dispatcher, store) = args.workflow.dispatcher().await?;

    let config = ServerConfig::with_port(args.port).with_max_in_flight(args.max_in_flight);
    let server = Server::new(config, dispatcher, store).context("Invalid server configuration")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting regstat");
    server
        .run_until_shutdown()
        .await
        .context("Notification listener failed")?;
    info!("regstat stopped");
    Ok(())
}
